//! Rule-based access controller.

use {
    async_trait::async_trait,
    remoql_model::{CallRequest, MethodDescriptor},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::debug,
};

use crate::{AccessController, AccessDenied, AccessType};

const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Allow,
    Deny,
}

/// One ACL entry. `model` and `method` accept `*`; `access_type: None`
/// matches both reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub model: String,
    pub method: String,
    #[serde(default)]
    pub access_type: Option<AccessType>,
    pub permission: Permission,
}

impl AclRule {
    pub fn new(model: impl Into<String>, method: impl Into<String>, permission: Permission) -> Self {
        Self {
            model: model.into(),
            method: method.into(),
            access_type: None,
            permission,
        }
    }

    #[must_use]
    pub fn for_access(mut self, access_type: AccessType) -> Self {
        self.access_type = Some(access_type);
        self
    }

    /// `None` when the rule does not apply, otherwise its specificity.
    fn specificity(&self, model: &str, method: &str, access: AccessType) -> Option<(bool, bool, bool)> {
        let model_exact = self.model == model;
        let method_exact = self.method == method;
        if !model_exact && self.model != WILDCARD {
            return None;
        }
        if !method_exact && self.method != WILDCARD {
            return None;
        }
        match self.access_type {
            Some(a) if a != access => None,
            Some(_) => Some((model_exact, method_exact, true)),
            None => Some((model_exact, method_exact, false)),
        }
    }
}

/// Evaluates [`AclRule`]s; the most specific matching rule wins and later
/// rules win ties. Without a match the default permission applies.
#[derive(Debug, Clone, Default)]
pub struct AclController {
    rules: Vec<AclRule>,
    default_permission: Permission,
}

impl AclController {
    pub fn new(rules: Vec<AclRule>, default_permission: Permission) -> Self {
        Self {
            rules,
            default_permission,
        }
    }

    pub fn decide(&self, model: &str, method: &MethodDescriptor) -> Permission {
        let access = AccessType::of(method.verb);
        self.rules
            .iter()
            .filter_map(|r| r.specificity(model, &method.name, access).map(|s| (s, r)))
            .max_by_key(|(s, _)| *s)
            .map_or(self.default_permission, |(_, r)| r.permission)
    }
}

#[async_trait]
impl AccessController for AclController {
    async fn check(
        &self,
        request: &CallRequest,
        model: &str,
        method: &MethodDescriptor,
        target_id: Option<&Value>,
    ) -> Result<(), AccessDenied> {
        let permission = self.decide(model, method);
        debug!(
            model,
            method = %method.name,
            ?target_id,
            org_id = ?request.org_id,
            ?permission,
            "acl decision"
        );
        match permission {
            Permission::Allow => Ok(()),
            Permission::Deny => Err(AccessDenied::new(model, method.name.as_str())),
        }
    }
}
