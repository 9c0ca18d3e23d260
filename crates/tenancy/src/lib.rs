//! Multi-tenant organization resolution.
//!
//! Requests carry tenant hints (`x-org-id` and `x-forwarded-host`). The
//! resolver turns them into a concrete [`OrgId`] through two process-wide
//! collaborators: an [`OrganizationCache`] and a [`DomainLookup`]. Both are
//! shared across concurrent calls and only ever read or lazily populated.

pub mod cache;
pub mod directory;
pub mod error;
pub mod resolve;

use {async_trait::async_trait, remoql_model::OrgId};

pub use {
    cache::CachedOrganizations,
    directory::{StaticDirectory, normalize_domain},
    error::{Error, IdentityHint, Result},
    resolve::{CURRENT_TENANT_SENTINEL, Resolution, is_current_tenant_sentinel, resolve_organization},
};

/// Cache-backed organization lookup by id.
#[async_trait]
pub trait OrganizationCache: Send + Sync {
    async fn find(&self, org_id: &str) -> Result<Option<OrgId>>;
}

/// Maps a request domain to an organization id.
#[async_trait]
pub trait DomainLookup: Send + Sync {
    async fn find_org_id_from_domain(&self, domain: &str) -> Result<Option<String>>;
}

/// Backing store consulted by [`CachedOrganizations`] on a cache miss.
#[async_trait]
pub trait OrganizationSource: Send + Sync {
    async fn load(&self, org_id: &str) -> Result<Option<OrgId>>;
}
