//! Operation definitions derived from remote method descriptors.

use std::{collections::HashMap, sync::Arc};

use {
    remoql_model::{MethodDescriptor, OperationKind, RemoteModel, ValueType, eligible_methods},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::{
    error::{Error, Result},
    pagination::PAGINATION_ARGS,
    types::CLIENT_MUTATION_ID,
};

/// Parameter whose missing value becomes `{}` instead of being dropped.
pub const FILTER_PARAM: &str = "filter";

/// Parameter that receives the normalized options map.
pub const OPTIONS_PARAM: &str = "options";

/// Field names the schema reserves for itself.
pub const RESERVED_OPERATION_NAMES: &[&str] = &["_operations"];

#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub value_type: ValueType,
    pub required: bool,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Single(ValueType),
    /// Cursor-paginated connection of the given node type.
    Connection(ValueType),
}

impl ResultType {
    pub fn is_connection(self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// One generated query or mutation.
pub struct OperationDefinition {
    pub name: String,
    pub kind: OperationKind,
    pub model: Arc<dyn RemoteModel>,
    pub method: MethodDescriptor,
    pub args: Vec<ArgSpec>,
    pub result: ResultType,
}

impl OperationDefinition {
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.method.description.as_deref()
    }

    /// `NameInput` / `NamePayload` prefix for mutation envelope types.
    pub fn type_prefix(&self) -> String {
        upper_first(&self.name)
    }

    pub fn source(&self) -> String {
        format!("{}.{}", self.model.name(), self.method.name)
    }
}

impl std::fmt::Debug for OperationDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("model", &self.model.name())
            .field("method", &self.method.name)
            .field("args", &self.args)
            .field("result", &self.result)
            .finish()
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Organization` + `findById` -> `organizationFindById`.
pub fn operation_name(model: &str, method: &str) -> String {
    format!("{}{}", lower_first(model), upper_first(method))
}

fn build_args(method: &MethodDescriptor) -> Vec<ArgSpec> {
    let mut args: Vec<ArgSpec> = method
        .accepts
        .iter()
        .map(|p| ArgSpec {
            name: p.name.clone(),
            value_type: p.value_type,
            required: p.required,
            default: (p.name == FILTER_PARAM).then(|| json!({})),
        })
        .collect();

    if method.returns.is_list {
        for name in PAGINATION_ARGS {
            if method.param(name).is_some() {
                continue;
            }
            let value_type = match *name {
                "first" | "last" => ValueType::Int,
                _ => ValueType::String,
            };
            args.push(ArgSpec {
                name: (*name).to_string(),
                value_type,
                required: false,
                default: None,
            });
        }
    }
    args
}

/// Build the definition for one eligible method.
pub fn build_operation(
    model: &Arc<dyn RemoteModel>,
    method: &MethodDescriptor,
    kind: OperationKind,
) -> OperationDefinition {
    let result = if method.returns.is_list {
        ResultType::Connection(method.returns.value_type)
    } else {
        ResultType::Single(method.returns.value_type)
    };
    OperationDefinition {
        name: operation_name(model.name(), &method.name),
        kind,
        model: Arc::clone(model),
        method: method.clone(),
        args: build_args(method),
        result,
    }
}

/// All operations of a set of models.
#[derive(Debug, Default)]
pub struct OperationSet {
    pub queries: Vec<Arc<OperationDefinition>>,
    pub mutations: Vec<Arc<OperationDefinition>>,
}

impl OperationSet {
    /// Generate operations for `models`, failing on the first name collision.
    pub fn build(models: &[Arc<dyn RemoteModel>]) -> Result<Self> {
        let mut seen: HashMap<String, String> = RESERVED_OPERATION_NAMES
            .iter()
            .map(|n| ((*n).to_string(), "the schema".to_string()))
            .collect();
        let mut set = Self::default();

        for model in models {
            for kind in [OperationKind::Query, OperationKind::Mutation] {
                for method in eligible_methods(model.name(), model.methods(), kind) {
                    let op = build_operation(model, method, kind);
                    if matches!(kind, OperationKind::Mutation)
                        && method.param(CLIENT_MUTATION_ID).is_some()
                    {
                        return Err(Error::NamingCollision {
                            name: format!("{}Input.{CLIENT_MUTATION_ID}", op.type_prefix()),
                            first: "the mutation envelope".to_string(),
                            second: op.source(),
                        });
                    }
                    if let Some(first) = seen.get(&op.name) {
                        return Err(Error::NamingCollision {
                            name: op.name.clone(),
                            first: first.clone(),
                            second: op.source(),
                        });
                    }
                    seen.insert(op.name.clone(), op.source());
                    debug!(operation = %op.name, source = %op.source(), ?kind, "operation generated");
                    match kind {
                        OperationKind::Query => set.queries.push(Arc::new(op)),
                        OperationKind::Mutation => set.mutations.push(Arc::new(op)),
                    }
                }
            }
        }
        Ok(set)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.queries
            .iter()
            .chain(self.mutations.iter())
            .map(|op| op.name.as_str())
    }
}
