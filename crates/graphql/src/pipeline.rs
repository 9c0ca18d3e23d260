//! Operation execution pipeline.
//!
//! A call flows through an ordered list of [`Step`]s, each taking the
//! current [`PipelineState`] by value and returning the next one. The first
//! failing step stops the chain and its error is returned as is. After the
//! steps, the model method is invoked and list results are paged.
//!
//! The standard chain is option normalization, organization resolution and
//! the access check.

use std::sync::Arc;

use {
    async_trait::async_trait,
    remoql_access::AccessController,
    remoql_model::{CallRequest, OperationKind},
    remoql_tenancy::{Resolution, is_current_tenant_sentinel, resolve_organization},
    serde_json::{Map, Value},
    tracing::{debug, trace},
};

use crate::{
    context::RequestContext,
    error::{Error, Result},
    operation::{FILTER_PARAM, OPTIONS_PARAM, OperationDefinition},
    pagination::{Connection, ConnectionArgs, connection_from_promised_array},
};

/// Key under which the resolved tenant id is threaded through `options`.
pub const ORG_ID_OPTION: &str = "orgId";

const ID_ARG: &str = "id";

/// Arguments of one call: the target id, the options map and every other
/// named argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationArgs {
    pub id: Option<Value>,
    pub options: Map<String, Value>,
    pub named: Map<String, Value>,
}

impl InvocationArgs {
    /// Split raw GraphQL arguments into the target id, options and the rest.
    pub fn from_map(mut raw: Map<String, Value>) -> Result<Self> {
        let id = raw.remove(ID_ARG).filter(|v| !v.is_null());
        let options = match raw.remove(OPTIONS_PARAM) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(Error::invalid_argument(OPTIONS_PARAM, "expected an object"));
            },
        };
        Ok(Self {
            id,
            options,
            named: raw,
        })
    }

    /// Current value of a declared parameter.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            ID_ARG => self.id.clone(),
            OPTIONS_PARAM => Some(Value::Object(self.options.clone())),
            _ => self.named.get(name).filter(|v| !v.is_null()).cloned(),
        }
    }

    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().and_then(Value::as_str)
    }

    pub fn org_id_option(&self) -> Option<&Value> {
        self.options.get(ORG_ID_OPTION)
    }
}

/// The record threaded through the steps.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub args: InvocationArgs,
    pub request: CallRequest,
}

impl PipelineState {
    pub fn new(args: InvocationArgs, request: CallRequest) -> Self {
        Self { args, request }
    }
}

/// Result of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(Value),
    Connection(Connection),
}

#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(
        &self,
        state: PipelineState,
        ctx: &RequestContext,
        op: &OperationDefinition,
    ) -> Result<PipelineState>;
}

/// Merges context-contributed options under the caller's options.
///
/// The context's map is copied so per-request values never leak into the
/// shared defaults; caller keys win.
pub struct NormalizeOptions;

#[async_trait]
impl Step for NormalizeOptions {
    fn name(&self) -> &'static str {
        "normalize_options"
    }

    async fn apply(
        &self,
        mut state: PipelineState,
        ctx: &RequestContext,
        _op: &OperationDefinition,
    ) -> Result<PipelineState> {
        let mut options = ctx.remote_options.clone();
        options.extend(std::mem::take(&mut state.args.options));
        state.args.options = options;
        Ok(state)
    }
}

/// Resolves the request's tenant and threads it into the arguments.
pub struct ResolveOrganization {
    tenant_model: String,
}

impl ResolveOrganization {
    pub fn new(tenant_model: impl Into<String>) -> Self {
        Self {
            tenant_model: tenant_model.into(),
        }
    }
}

#[async_trait]
impl Step for ResolveOrganization {
    fn name(&self) -> &'static str {
        "resolve_organization"
    }

    async fn apply(
        &self,
        mut state: PipelineState,
        ctx: &RequestContext,
        op: &OperationDefinition,
    ) -> Result<PipelineState> {
        let targets_current_tenant =
            op.model_name() == self.tenant_model && is_current_tenant_sentinel(state.args.id_str());

        let resolution = resolve_organization(
            &state.request,
            targets_current_tenant,
            ctx.organization_cache.as_ref(),
            ctx.domain_lookup.as_ref(),
        )
        .await?;

        match &resolution {
            Resolution::Target(org_id) => state.args.id = Some(org_id.to_value()),
            Resolution::Scope(org_id) => {
                state
                    .args
                    .options
                    .insert(ORG_ID_OPTION.to_string(), org_id.to_value());
            },
            Resolution::Unscoped => {},
        }
        if let Some(org_id) = resolution.org_id() {
            debug!(operation = %op.name, org_id = %org_id, "tenant resolved");
            state.request.org_id = Some(org_id.clone());
        }
        Ok(state)
    }
}

/// Asks the access controller whether the call may proceed.
pub struct CheckAccess {
    controller: Arc<dyn AccessController>,
}

impl CheckAccess {
    pub fn new(controller: Arc<dyn AccessController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Step for CheckAccess {
    fn name(&self) -> &'static str {
        "check_access"
    }

    async fn apply(
        &self,
        state: PipelineState,
        _ctx: &RequestContext,
        op: &OperationDefinition,
    ) -> Result<PipelineState> {
        self.controller
            .check(
                &state.request,
                op.model_name(),
                &op.method,
                state.args.id.as_ref(),
            )
            .await?;
        Ok(state)
    }
}

/// Positional parameters in declaration order.
///
/// Queries drop missing values; mutations keep every position, passing
/// `null` for missing ones. A missing `filter` becomes `{}`.
pub fn positional_params(op: &OperationDefinition, args: &InvocationArgs) -> Vec<Value> {
    let mut params = Vec::with_capacity(op.method.accepts.len());
    for param in &op.method.accepts {
        let value = match args.get(&param.name) {
            None if param.name == FILTER_PARAM => Some(Value::Object(Map::new())),
            other => other,
        };
        match (value, op.kind) {
            (Some(v), _) => params.push(v),
            (None, OperationKind::Mutation) => params.push(Value::Null),
            (None, OperationKind::Query) => {},
        }
    }
    params
}

/// Invoke the model method and page list results.
pub async fn invoke(op: &OperationDefinition, state: PipelineState) -> Result<Outcome> {
    let params = positional_params(op, &state.args);
    trace!(operation = %op.name, params = params.len(), "invoking model method");

    let call = async {
        op.model
            .invoke(&op.method.name, params, &state.request)
            .await
            .map_err(Error::from)
    };

    if !op.result.is_connection() {
        return Ok(Outcome::Value(call.await?));
    }

    let paging = ConnectionArgs::from_args(&state.args)?;
    let items = async {
        match call.await? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(Error::NotAList {
                operation: op.name.clone(),
                found: value_kind(&other).to_string(),
            }),
        }
    };
    Ok(Outcome::Connection(
        connection_from_promised_array(items, &paging).await?,
    ))
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ordered, composable chain of steps.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize options, resolve the organization, check access.
    pub fn standard(tenant_model: impl Into<String>, access: Arc<dyn AccessController>) -> Self {
        Self::new()
            .then(NormalizeOptions)
            .then(ResolveOrganization::new(tenant_model))
            .then(CheckAccess::new(access))
    }

    #[must_use]
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order.
    pub async fn prepare(
        &self,
        mut state: PipelineState,
        ctx: &RequestContext,
        op: &OperationDefinition,
    ) -> Result<PipelineState> {
        for step in &self.steps {
            trace!(operation = %op.name, step = step.name(), "pipeline step");
            state = step.apply(state, ctx, op).await.inspect_err(|e| {
                debug!(operation = %op.name, step = step.name(), error = %e, "pipeline aborted");
            })?;
        }
        Ok(state)
    }

    /// Run every step, then invoke the method.
    pub async fn execute(
        &self,
        args: InvocationArgs,
        ctx: &RequestContext,
        op: &OperationDefinition,
    ) -> Result<Outcome> {
        let state = PipelineState::new(args, ctx.request.clone());
        let state = self.prepare(state, ctx, op).await?;
        invoke(op, state).await
    }
}
