/// Config schema types (server, graphql, tenancy, access, logging).
use {
    remoql_access::{AclRule, Permission},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoqlConfig {
    pub server: ServerConfig,
    pub graphql: GraphqlConfig,
    pub tenancy: TenancyConfig,
    pub access: AccessConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 4000,
        }
    }
}

impl ServerConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlConfig {
    /// Route serving GraphQL requests.
    pub path: String,
    /// Route serving the GraphiQL playground. `None` disables it.
    pub playground_path: Option<String>,
    /// Model whose `"this"` id designates the caller's organization.
    pub tenant_model: String,
    /// Options every call receives, under the caller's own `options`.
    pub remote_options: Map<String, Value>,
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            path: "/graphql".into(),
            playground_path: Some("/svc/playground".into()),
            tenant_model: "Organization".into(),
            remote_options: Map::new(),
        }
    }
}

/// One organization of the built-in directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationEntry {
    pub id: String,
    #[serde(default)]
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenancyConfig {
    pub organizations: Vec<OrganizationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub default_permission: Permission,
    /// Evaluated most-specific first; later rules win ties.
    pub rules: Vec<AclRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use {super::*, remoql_access::AccessType};

    #[test]
    fn defaults() {
        let cfg = RemoqlConfig::default();
        assert_eq!(cfg.server.address(), "127.0.0.1:4000");
        assert_eq!(cfg.graphql.path, "/graphql");
        assert_eq!(cfg.graphql.playground_path.as_deref(), Some("/svc/playground"));
        assert_eq!(cfg.graphql.tenant_model, "Organization");
        assert_eq!(cfg.access.default_permission, Permission::Allow);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: RemoqlConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [[tenancy.organizations]]
            id = "7"
            domains = ["acme.example.com"]

            [access]
            default_permission = "deny"

            [[access.rules]]
            model = "Widget"
            method = "*"
            access_type = "read"
            permission = "allow"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.address(), "127.0.0.1:8080");
        assert_eq!(cfg.tenancy.organizations[0].domains, ["acme.example.com"]);
        assert_eq!(cfg.access.default_permission, Permission::Deny);
        assert_eq!(
            cfg.access.rules,
            [AclRule::new("Widget", "*", Permission::Allow).for_access(AccessType::Read)]
        );
        assert_eq!(cfg.graphql, GraphqlConfig::default());
    }
}
