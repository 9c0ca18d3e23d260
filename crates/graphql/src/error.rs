//! Error kinds of schema generation and operation execution.
//!
//! Runtime failures from collaborators are wrapped transparently so their
//! message reaches the GraphQL caller unchanged; only an `extensions.code`
//! is added.

use {
    async_graphql::ErrorExtensions,
    remoql_access::AccessDenied,
    remoql_model::ModelError,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two methods map to the same operation name. Aborts generation.
    #[error("operation name collision: {name} is generated by both {first} and {second}")]
    NamingCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("failed to build schema: {0}")]
    Schema(String),

    #[error(transparent)]
    Tenancy(#[from] remoql_tenancy::Error),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error(transparent)]
    Invocation(#[from] ModelError),

    #[error("invalid pagination arguments: {0}")]
    InvalidPagination(String),

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("{operation} is declared to return a list but the model returned {found}")]
    NotAList { operation: String, found: String },
}

impl Error {
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Tenancy(e) if e.is_unresolved_identity() => "UNRESOLVED_IDENTITY",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::Invocation(_) => "INVOCATION_FAILED",
            Self::InvalidPagination(_) | Self::InvalidArgument { .. } => "BAD_USER_INPUT",
            Self::Tenancy(_)
            | Self::NamingCollision { .. }
            | Self::Schema(_)
            | Self::NotAList { .. } => "INTERNAL",
        }
    }

    /// Convert into a GraphQL error, keeping the original error as the
    /// error source so callers can downcast it.
    pub fn into_graphql(self) -> async_graphql::Error {
        let code = self.code();
        let err = match self {
            Self::AccessDenied(e) => async_graphql::Error::new_with_source(e),
            Self::Invocation(e) => {
                let model_code = e.code.clone();
                async_graphql::Error::new_with_source(e).extend_with(|_, ext| {
                    if let Some(model_code) = model_code {
                        ext.set("modelCode", model_code);
                    }
                })
            },
            other => async_graphql::Error::new_with_source(other),
        };
        err.extend_with(|_, ext| ext.set("code", code))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_message_is_untouched() {
        let denied = AccessDenied::new("Widget", "find").with_message("nope");
        let gql = Error::from(denied.clone()).into_graphql();
        assert_eq!(gql.message, "nope");
        let source = gql
            .source
            .as_ref()
            .and_then(|s| s.downcast_ref::<AccessDenied>());
        assert_eq!(source, Some(&denied));
    }

    #[test]
    fn unresolved_identity_has_its_own_code() {
        let err = Error::from(remoql_tenancy::Error::MissingIdentity);
        assert_eq!(err.code(), "UNRESOLVED_IDENTITY");
        let err = Error::from(remoql_tenancy::Error::backend("redis down"));
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn invocation_error_keeps_model_message() {
        let gql = Error::from(ModelError::new("boom").with_code("E_BOOM")).into_graphql();
        assert_eq!(gql.message, "boom");
        let source = gql
            .source
            .as_ref()
            .and_then(|s| s.downcast_ref::<ModelError>());
        assert!(source.is_some());
    }
}
