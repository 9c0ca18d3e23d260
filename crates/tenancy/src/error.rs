use std::fmt;

/// The tenant hint that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityHint {
    ExplicitOrgId(String),
    Domain(String),
}

impl fmt::Display for IdentityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitOrgId(v) => write!(f, "x-org-id {v}"),
            Self::Domain(v) => write!(f, "domain (x-forwarded-host) {v}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No x-org-id or domain (x-forwarded-host) found for resolution of Organization id.")]
    MissingIdentity,

    #[error("Unable to resolve Organization id with value of {hint}")]
    UnresolvedIdentity { hint: IdentityHint },

    #[error("organization lookup failed: {message}")]
    Backend { message: String },
}

impl Error {
    #[must_use]
    pub fn backend(message: impl fmt::Display) -> Self {
        Self::Backend {
            message: message.to_string(),
        }
    }

    /// Both the missing and the unresolvable case count as an unresolved identity.
    pub fn is_unresolved_identity(&self) -> bool {
        matches!(self, Self::MissingIdentity | Self::UnresolvedIdentity { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
