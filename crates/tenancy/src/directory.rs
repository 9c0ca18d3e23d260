use std::collections::{HashMap, HashSet};

use {async_trait::async_trait, remoql_model::OrgId};

use crate::{DomainLookup, OrganizationSource, Result};

/// Fixed organization directory, usually built from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    ids: HashSet<String>,
    domains: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_organization<I, D>(mut self, id: impl Into<String>, domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        let id = id.into();
        for domain in domains {
            self.domains
                .insert(normalize_domain(domain.as_ref()), id.clone());
        }
        self.ids.insert(id);
        self
    }
}

/// Lowercase host without port or trailing dot. For a comma-separated
/// forwarded list the first (client-facing) host is used.
///
/// Two domains that normalize equally are the same key in the directory.
pub fn normalize_domain(raw: &str) -> String {
    let first = raw.split(',').next().unwrap_or(raw).trim();
    let host = match first.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => first,
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

#[async_trait]
impl OrganizationSource for StaticDirectory {
    async fn load(&self, org_id: &str) -> Result<Option<OrgId>> {
        Ok(self.ids.get(org_id.trim()).map(|id| OrgId::new(id.as_str())))
    }
}

#[async_trait]
impl DomainLookup for StaticDirectory {
    async fn find_org_id_from_domain(&self, domain: &str) -> Result<Option<String>> {
        Ok(self.domains.get(&normalize_domain(domain)).cloned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn directory() -> StaticDirectory {
        StaticDirectory::new()
            .with_organization("7", ["acme.example.com", "ACME.test"])
            .with_organization("42", Vec::<String>::new())
    }

    #[test]
    fn normalizes_hosts() {
        assert_eq!(normalize_domain("Acme.Example.com:8443"), "acme.example.com");
        assert_eq!(normalize_domain("a.example.com, proxy.local"), "a.example.com");
        assert_eq!(normalize_domain("example.com."), "example.com");
    }

    #[tokio::test]
    async fn resolves_known_domains() {
        let dir = directory();
        assert_eq!(
            dir.find_org_id_from_domain("acme.example.com:443")
                .await
                .unwrap(),
            Some("7".to_string())
        );
        assert_eq!(
            dir.find_org_id_from_domain("acme.test").await.unwrap(),
            Some("7".to_string())
        );
        assert_eq!(dir.find_org_id_from_domain("other.example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn loads_known_ids() {
        let dir = directory();
        assert_eq!(dir.load("42").await.unwrap(), Some(OrgId::new("42")));
        assert_eq!(dir.load("43").await.unwrap(), None);
    }
}
