//! Per-call request context.

use std::sync::Arc;

use {
    remoql_model::CallRequest,
    remoql_tenancy::{DomainLookup, OrganizationCache},
    serde_json::{Map, Value},
};

/// Context attached to every GraphQL request via `Request::data`.
///
/// A new value is built for each incoming call and never reused. The two
/// tenancy collaborators are process-wide and shared between contexts.
pub struct RequestContext {
    pub request: CallRequest,
    pub organization_cache: Arc<dyn OrganizationCache>,
    pub domain_lookup: Arc<dyn DomainLookup>,
    /// Options contributed by the context, merged under the caller's own.
    pub remote_options: Map<String, Value>,
}

impl RequestContext {
    pub fn new(
        request: CallRequest,
        organization_cache: Arc<dyn OrganizationCache>,
        domain_lookup: Arc<dyn DomainLookup>,
    ) -> Self {
        Self {
            request,
            organization_cache,
            domain_lookup,
            remote_options: Map::new(),
        }
    }

    #[must_use]
    pub fn with_remote_options(mut self, options: Map<String, Value>) -> Self {
        self.remote_options = options;
        self
    }
}
