//! Remote model collaborator interface.
//!
//! Models declare their remote methods as a static table of
//! [`MethodDescriptor`]s and execute them through [`RemoteModel::invoke`]
//! with positional arguments. Everything the graph layer needs to know about
//! a model goes through this crate.

pub mod descriptor;
pub mod extract;
pub mod request;

use {async_trait::async_trait, serde_json::Value};

pub use {
    descriptor::{MethodDescriptor, OutputShape, ParamSpec, ValueType, Verb},
    extract::{OperationKind, eligible_methods},
    request::{CallRequest, FORWARDED_HOST_HEADER, ORG_ID_HEADER, OrgId, UnreadableHeader},
};

/// Error raised by a model while executing one of its methods.
///
/// It reaches the graph caller untouched.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ModelError {
    pub message: String,
    pub code: Option<String>,
}

impl ModelError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<String> for ModelError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ModelError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub type ModelResult<T = Value> = Result<T, ModelError>;

/// A backend data model exposing remote methods.
#[async_trait]
pub trait RemoteModel: Send + Sync {
    /// Model name, e.g. `Organization`.
    fn name(&self) -> &str;

    /// Declared remote methods, in declaration order.
    fn methods(&self) -> &[MethodDescriptor];

    /// Invoke `method` with positional `params` built from its declared inputs.
    async fn invoke(&self, method: &str, params: Vec<Value>, request: &CallRequest)
    -> ModelResult;
}
