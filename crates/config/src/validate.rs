//! Semantic checks on a loaded configuration.

use std::{collections::HashMap, net::IpAddr};

use remoql_tenancy::normalize_domain;

use crate::schema::RemoqlConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "graphql.path"
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

#[must_use]
pub fn validate_config(config: &RemoqlConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let graphql = &config.graphql;

    if !graphql.path.starts_with('/') {
        result.push(Severity::Error, "graphql.path", "route must start with '/'");
    }
    if let Some(playground) = &graphql.playground_path {
        if !playground.starts_with('/') {
            result.push(
                Severity::Error,
                "graphql.playground_path",
                "route must start with '/'",
            );
        }
        if *playground == graphql.path {
            result.push(
                Severity::Error,
                "graphql.playground_path",
                "playground and GraphQL routes must differ",
            );
        }
    }
    if graphql.tenant_model.is_empty() {
        result.push(Severity::Error, "graphql.tenant_model", "must not be empty");
    }

    let mut owners: HashMap<String, &str> = HashMap::new();
    for (i, org) in config.tenancy.organizations.iter().enumerate() {
        if org.id.trim().is_empty() {
            result.push(
                Severity::Error,
                format!("tenancy.organizations[{i}].id"),
                "must not be empty",
            );
        }
        for domain in &org.domains {
            let key = normalize_domain(domain);
            if let Some(previous) = owners.insert(key, &org.id)
                && previous != org.id
            {
                result.push(
                    Severity::Error,
                    format!("tenancy.organizations[{i}].domains"),
                    format!("domain {domain} is already mapped to organization {previous}"),
                );
            }
        }
    }

    for (i, rule) in config.access.rules.iter().enumerate() {
        if rule.model.is_empty() || rule.method.is_empty() {
            result.push(
                Severity::Error,
                format!("access.rules[{i}]"),
                "model and method must be set; use \"*\" to match any",
            );
        }
    }

    if !is_loopback(&config.server.bind)
        && config.access.rules.is_empty()
        && config.access.default_permission == remoql_access::Permission::Allow
    {
        result.push(
            Severity::Warning,
            "access",
            "listening on a non-loopback address with no access rules; every call is allowed",
        );
    }

    result
}

fn is_loopback(bind: &str) -> bool {
    bind.eq_ignore_ascii_case("localhost")
        || bind
            .trim_matches(['[', ']'])
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}
