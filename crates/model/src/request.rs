//! Per-call request record shared by the pipeline and the invoked model.

use std::fmt;

use {http::HeaderMap, serde_json::Value};

/// Explicit tenant hint header.
pub const ORG_ID_HEADER: &str = "x-org-id";

/// Domain hint header used for tenant resolution.
pub const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// A resolved tenant identifier.
///
/// Tenant ids are usually numeric. [`OrgId::to_value`] yields a JSON integer
/// when the id parses as one and falls back to the original string otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrgId(String);

impl OrgId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }

    pub fn to_value(&self) -> Value {
        match self.as_i64() {
            Some(n) => Value::from(n),
            None => Value::String(self.0.clone()),
        }
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrgId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<i64> for OrgId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// The raw request as seen by the pipeline.
///
/// Created fresh for every incoming operation call. `org_id` is filled in by
/// organization resolution so later steps and the model read it uniformly.
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    pub headers: HeaderMap,
    pub org_id: Option<OrgId>,
}

impl CallRequest {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            org_id: None,
        }
    }

    /// Trimmed value of `name`.
    ///
    /// `None` only when the header is absent. A present value that is blank
    /// or not valid UTF-8 comes back as [`UnreadableHeader`].
    pub fn header(&self, name: &str) -> Option<Result<&str, UnreadableHeader>> {
        let raw = self.headers.get(name)?;
        let readable = raw
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        Some(readable.ok_or_else(|| UnreadableHeader {
            name: name.to_string(),
            value: String::from_utf8_lossy(raw.as_bytes()).trim().to_string(),
        }))
    }

    pub fn explicit_org_id(&self) -> Option<Result<&str, UnreadableHeader>> {
        self.header(ORG_ID_HEADER)
    }

    pub fn domain(&self) -> Option<Result<&str, UnreadableHeader>> {
        self.header(FORWARDED_HOST_HEADER)
    }
}

/// A header that was sent but carries no usable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unreadable {name} header value {value:?}")]
pub struct UnreadableHeader {
    pub name: String,
    /// Lossy, trimmed rendering of the raw bytes.
    pub value: String,
}
