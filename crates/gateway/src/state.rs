use std::sync::Arc;

use {
    anyhow::Context,
    axum::http::HeaderMap,
    remoql_access::AclController,
    remoql_config::RemoqlConfig,
    remoql_graphql::{RemoqlSchema, RequestContext, SchemaBuilder},
    remoql_model::{CallRequest, RemoteModel},
    remoql_tenancy::{CachedOrganizations, DomainLookup, OrganizationCache, StaticDirectory},
    serde_json::{Map, Value},
};

/// Process-wide state shared by every request.
pub struct GatewayState {
    pub schema: RemoqlSchema,
    pub organization_cache: Arc<dyn OrganizationCache>,
    pub domain_lookup: Arc<dyn DomainLookup>,
    /// Merged under each caller's `options`.
    pub remote_options: Map<String, Value>,
    pub graphql_path: String,
    pub playground_path: Option<String>,
    pub version: &'static str,
}

impl GatewayState {
    pub fn new(
        schema: RemoqlSchema,
        organization_cache: Arc<dyn OrganizationCache>,
        domain_lookup: Arc<dyn DomainLookup>,
    ) -> Self {
        Self {
            schema,
            organization_cache,
            domain_lookup,
            remote_options: Map::new(),
            graphql_path: "/graphql".into(),
            playground_path: Some("/svc/playground".into()),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Build the schema for `models` and wire the collaborators described by
    /// `config`: a static organization directory behind a lazy cache, and a
    /// rule-based access controller.
    pub fn from_config(config: &RemoqlConfig, models: Vec<Arc<dyn RemoteModel>>) -> anyhow::Result<Self> {
        let directory = config
            .tenancy
            .organizations
            .iter()
            .fold(StaticDirectory::new(), |dir, org| {
                dir.with_organization(org.id.clone(), &org.domains)
            });
        let access = AclController::new(config.access.rules.clone(), config.access.default_permission);

        let schema = SchemaBuilder::new(Arc::new(access))
            .models(models)
            .tenant_model(config.graphql.tenant_model.clone())
            .build()
            .context("failed to build GraphQL schema")?;

        let mut state = Self::new(
            schema,
            Arc::new(CachedOrganizations::new(directory.clone())),
            Arc::new(directory),
        );
        state.remote_options = config.graphql.remote_options.clone();
        state.graphql_path = config.graphql.path.clone();
        state.playground_path = config.graphql.playground_path.clone();
        Ok(state)
    }

    /// Fresh per-call context from the request headers.
    pub fn request_context(&self, headers: HeaderMap) -> RequestContext {
        RequestContext::new(
            CallRequest::new(headers),
            Arc::clone(&self.organization_cache),
            Arc::clone(&self.domain_lookup),
        )
        .with_remote_options(self.remote_options.clone())
    }
}
