//! Access control for generated operations.
//!
//! Every operation call asks an [`AccessController`] whether the request may
//! run `model.method` against an optional target id. A denial aborts the call
//! and its [`AccessDenied`] error reaches the caller as is.

pub mod acl;

use {
    async_trait::async_trait,
    remoql_model::{CallRequest, MethodDescriptor, Verb},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

pub use acl::{AclController, AclRule, Permission};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AccessDenied {
    pub message: String,
    pub model: String,
    pub method: String,
}

impl AccessDenied {
    #[must_use]
    pub fn new(model: impl Into<String>, method: impl Into<String>) -> Self {
        let model = model.into();
        let method = method.into();
        Self {
            message: format!("Authorization Required: access to {model}.{method} denied"),
            model,
            method,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Read or write access, derived from the method's verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Read,
    Write,
}

impl AccessType {
    pub fn of(verb: Verb) -> Self {
        match verb {
            Verb::Get | Verb::Head => Self::Read,
            _ => Self::Write,
        }
    }
}

#[async_trait]
pub trait AccessController: Send + Sync {
    async fn check(
        &self,
        request: &CallRequest,
        model: &str,
        method: &MethodDescriptor,
        target_id: Option<&Value>,
    ) -> Result<(), AccessDenied>;
}

/// Grants every call.
pub struct AllowAll;

#[async_trait]
impl AccessController for AllowAll {
    async fn check(
        &self,
        _request: &CallRequest,
        _model: &str,
        _method: &MethodDescriptor,
        _target_id: Option<&Value>,
    ) -> Result<(), AccessDenied> {
        Ok(())
    }
}
