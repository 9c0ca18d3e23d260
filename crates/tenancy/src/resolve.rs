//! Tenant resolution state machine.
//!
//! | target            | x-org-id | x-forwarded-host | outcome                         |
//! |-------------------|----------|------------------|---------------------------------|
//! | tenant + `"this"` | set      | any              | cache(x-org-id) -> `Target`     |
//! | tenant + `"this"` | unset    | set              | domain -> cache -> `Target`     |
//! | tenant + `"this"` | unset    | unset            | `MissingIdentity`               |
//! | anything else     | set      | any              | cache(x-org-id) -> `Scope`      |
//! | anything else     | unset    | set              | domain -> cache -> `Scope`      |
//! | anything else     | unset    | unset            | `Unscoped`                      |
//!
//! A header that is sent blank or unreadable still counts as set: it takes
//! its row and fails with `UnresolvedIdentity` naming that header.

use {
    remoql_model::{CallRequest, OrgId},
    tracing::debug,
};

use crate::{DomainLookup, Error, IdentityHint, OrganizationCache, Result};

/// Id placeholder meaning "the organization of the current request".
pub const CURRENT_TENANT_SENTINEL: &str = "this";

pub fn is_current_tenant_sentinel(id: Option<&str>) -> bool {
    id == Some(CURRENT_TENANT_SENTINEL)
}

/// Outcome of resolving a request's tenant hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Replaces the `"this"` target id of a tenant-model operation.
    Target(OrgId),
    /// Scopes an operation on any other model to the tenant.
    Scope(OrgId),
    /// No hint present; the call proceeds without tenant scoping.
    Unscoped,
}

impl Resolution {
    pub fn org_id(&self) -> Option<&OrgId> {
        match self {
            Self::Target(id) | Self::Scope(id) => Some(id),
            Self::Unscoped => None,
        }
    }
}

/// Resolve the tenant of `request`.
///
/// `targets_current_tenant` is true when the operation runs on the tenant
/// model with the [`CURRENT_TENANT_SENTINEL`] id. The explicit `x-org-id`
/// header always wins over the domain; when it is present the domain lookup
/// is never consulted.
pub async fn resolve_organization(
    request: &CallRequest,
    targets_current_tenant: bool,
    cache: &dyn OrganizationCache,
    domains: &dyn DomainLookup,
) -> Result<Resolution> {
    let resolved = if let Some(explicit) = request.explicit_org_id() {
        let explicit = explicit.map_err(|e| Error::UnresolvedIdentity {
            hint: IdentityHint::ExplicitOrgId(e.value),
        })?;
        let hint = IdentityHint::ExplicitOrgId(explicit.to_string());
        let found = cache.find(explicit).await?;
        debug!(org_id = explicit, found = found.is_some(), "resolving tenant from x-org-id");
        require(found, hint)?
    } else if let Some(domain) = request.domain() {
        let domain = domain.map_err(|e| Error::UnresolvedIdentity {
            hint: IdentityHint::Domain(e.value),
        })?;
        let hint = IdentityHint::Domain(domain.to_string());
        let found = match domains.find_org_id_from_domain(domain).await? {
            Some(org_id) => cache.find(&org_id).await?,
            None => None,
        };
        debug!(domain, found = found.is_some(), "resolving tenant from domain");
        require(found, hint)?
    } else if targets_current_tenant {
        return Err(Error::MissingIdentity);
    } else {
        return Ok(Resolution::Unscoped);
    };

    Ok(if targets_current_tenant {
        Resolution::Target(resolved)
    } else {
        Resolution::Scope(resolved)
    })
}

fn require(found: Option<OrgId>, hint: IdentityHint) -> Result<OrgId> {
    found.ok_or(Error::UnresolvedIdentity { hint })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::sync::Mutex;

    use {
        super::*,
        async_trait::async_trait,
        http::{HeaderMap, HeaderValue},
        remoql_model::{FORWARDED_HOST_HEADER, ORG_ID_HEADER},
    };

    /// Records every collaborator call in order.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        fn push(&self, call: String) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(call);
        }
    }

    #[async_trait]
    impl OrganizationCache for Recorder {
        async fn find(&self, org_id: &str) -> Result<Option<OrgId>> {
            self.push(format!("cache:{org_id}"));
            Ok(matches!(org_id, "42" | "7").then(|| OrgId::new(org_id)))
        }
    }

    #[async_trait]
    impl DomainLookup for Recorder {
        async fn find_org_id_from_domain(&self, domain: &str) -> Result<Option<String>> {
            self.push(format!("domain:{domain}"));
            Ok((domain == "acme.example.com").then(|| "7".to_string()))
        }
    }

    fn request(org: Option<&'static str>, host: Option<&'static str>) -> CallRequest {
        let mut headers = HeaderMap::new();
        if let Some(org) = org {
            headers.insert(ORG_ID_HEADER, HeaderValue::from_static(org));
        }
        if let Some(host) = host {
            headers.insert(FORWARDED_HOST_HEADER, HeaderValue::from_static(host));
        }
        CallRequest::new(headers)
    }

    async fn run(req: &CallRequest, sentinel: bool, rec: &Recorder) -> Result<Resolution> {
        resolve_organization(req, sentinel, rec, rec).await
    }

    #[tokio::test]
    async fn explicit_header_wins_over_domain() {
        let rec = Recorder::default();
        let req = request(Some("42"), Some("acme.example.com"));
        let res = run(&req, false, &rec).await.unwrap();
        assert_eq!(res, Resolution::Scope(OrgId::new("42")));
        assert_eq!(rec.calls(), ["cache:42"]);
    }

    #[tokio::test]
    async fn domain_lookup_then_cache() {
        let rec = Recorder::default();
        let req = request(None, Some("acme.example.com"));
        let res = run(&req, false, &rec).await.unwrap();
        assert_eq!(res, Resolution::Scope(OrgId::new("7")));
        assert_eq!(rec.calls(), ["domain:acme.example.com", "cache:7"]);
    }

    #[tokio::test]
    async fn sentinel_resolves_to_target() {
        let rec = Recorder::default();
        let req = request(Some("42"), None);
        let res = run(&req, true, &rec).await.unwrap();
        assert_eq!(res, Resolution::Target(OrgId::new("42")));

        let rec = Recorder::default();
        let req = request(None, Some("acme.example.com"));
        let res = run(&req, true, &rec).await.unwrap();
        assert_eq!(res, Resolution::Target(OrgId::new("7")));
    }

    #[tokio::test]
    async fn sentinel_without_hints_fails() {
        let rec = Recorder::default();
        let err = run(&request(None, None), true, &rec).await.unwrap_err();
        assert!(matches!(err, Error::MissingIdentity));
        assert!(err.is_unresolved_identity());
        assert!(rec.calls().is_empty());
    }

    #[tokio::test]
    async fn no_hints_leaves_call_unscoped() {
        let rec = Recorder::default();
        let res = run(&request(None, None), false, &rec).await.unwrap();
        assert_eq!(res, Resolution::Unscoped);
        assert!(res.org_id().is_none());
        assert!(rec.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_explicit_id_names_the_header() {
        let rec = Recorder::default();
        let req = request(Some("99"), Some("acme.example.com"));
        let err = run(&req, false, &rec).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to resolve Organization id with value of x-org-id 99"
        );
        assert_eq!(rec.calls(), ["cache:99"]);
    }

    #[tokio::test]
    async fn unknown_domain_names_the_domain() {
        let rec = Recorder::default();
        let req = request(None, Some("nobody.example.com"));
        let err = run(&req, false, &rec).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to resolve Organization id with value of domain (x-forwarded-host) nobody.example.com"
        );
        assert_eq!(rec.calls(), ["domain:nobody.example.com"]);
    }

    fn raw_request(org: &[u8], host: Option<&'static str>) -> CallRequest {
        let mut headers = HeaderMap::new();
        headers.insert(ORG_ID_HEADER, HeaderValue::from_bytes(org).unwrap());
        if let Some(host) = host {
            headers.insert(FORWARDED_HOST_HEADER, HeaderValue::from_static(host));
        }
        CallRequest::new(headers)
    }

    #[tokio::test]
    async fn unreadable_explicit_id_fails_without_lookup() {
        let rec = Recorder::default();
        let err = run(&raw_request(b"4\xe92", None), false, &rec)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedIdentity {
                hint: IdentityHint::ExplicitOrgId(_)
            }
        ));
        assert!(rec.calls().is_empty());
    }

    #[tokio::test]
    async fn unreadable_explicit_id_still_beats_domain() {
        let rec = Recorder::default();
        let req = raw_request(b"4\xe92", Some("acme.example.com"));
        let err = run(&req, false, &rec).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedIdentity {
                hint: IdentityHint::ExplicitOrgId(_)
            }
        ));
        assert!(rec.calls().is_empty());

        let rec = Recorder::default();
        let req = raw_request(b"   ", Some("acme.example.com"));
        let err = run(&req, true, &rec).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to resolve Organization id with value of x-org-id "
        );
        assert!(rec.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_domain_fails() {
        let rec = Recorder::default();
        let err = run(&request(None, Some(" ")), false, &rec).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedIdentity {
                hint: IdentityHint::Domain(_)
            }
        ));
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn sentinel_matching_is_exact() {
        assert!(is_current_tenant_sentinel(Some("this")));
        assert!(!is_current_tenant_sentinel(Some("This")));
        assert!(!is_current_tenant_sentinel(None));
    }
}
