//! Schema construction and type alias.

use std::sync::Arc;

use {
    async_graphql::dynamic::{
        Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ObjectAccessor, Schema,
        TypeRef,
    },
    remoql_access::AccessController,
    remoql_model::RemoteModel,
    serde_json::{Map, Value},
    tracing::info,
};

use crate::{
    context::RequestContext,
    error::{Error, Result},
    operation::{ArgSpec, OperationDefinition, OperationSet, ResultType},
    pipeline::{InvocationArgs, Pipeline},
    scalars::{gql_value_to_json, json_scalar, json_to_gql_value, scalar_name},
    types::{
        CLIENT_MUTATION_ID, MutationPayload, connection_objects, outcome_field_value,
        page_info_object, payload_object, result_type_ref,
    },
};

/// The generated schema. Every request must carry a [`RequestContext`].
pub type RemoqlSchema = Schema;

pub const QUERY_ROOT: &str = "Query";
pub const MUTATION_ROOT: &str = "Mutation";

/// Model whose `"this"` id refers to the caller's own organization.
pub const DEFAULT_TENANT_MODEL: &str = "Organization";

/// Lists the generated operation names; keeps `Query` non-empty.
const OPERATIONS_FIELD: &str = "_operations";

const MUTATION_INPUT_ARG: &str = "input";

/// Build a schema for `models` with the standard pipeline.
pub fn build_schema(
    models: &[Arc<dyn RemoteModel>],
    access: Arc<dyn AccessController>,
) -> Result<RemoqlSchema> {
    SchemaBuilder::new(access).models(models.iter().cloned()).build()
}

pub struct SchemaBuilder {
    models: Vec<Arc<dyn RemoteModel>>,
    access: Arc<dyn AccessController>,
    tenant_model: String,
    pipeline: Option<Pipeline>,
}

impl SchemaBuilder {
    pub fn new(access: Arc<dyn AccessController>) -> Self {
        Self {
            models: Vec::new(),
            access,
            tenant_model: DEFAULT_TENANT_MODEL.to_string(),
            pipeline: None,
        }
    }

    #[must_use]
    pub fn model(mut self, model: Arc<dyn RemoteModel>) -> Self {
        self.models.push(model);
        self
    }

    #[must_use]
    pub fn models(mut self, models: impl IntoIterator<Item = Arc<dyn RemoteModel>>) -> Self {
        self.models.extend(models);
        self
    }

    #[must_use]
    pub fn tenant_model(mut self, name: impl Into<String>) -> Self {
        self.tenant_model = name.into();
        self
    }

    /// Replace the standard pipeline.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn build(self) -> Result<RemoqlSchema> {
        let operations = OperationSet::build(&self.models)?;
        let pipeline = Arc::new(
            self.pipeline
                .unwrap_or_else(|| Pipeline::standard(self.tenant_model, self.access)),
        );

        let names: Vec<String> = operations.names().map(str::to_string).collect();
        let mut query = Object::new(QUERY_ROOT).field(Field::new(
            OPERATIONS_FIELD,
            TypeRef::named_nn_list_nn(TypeRef::STRING),
            move |_| {
                let names = names.clone();
                FieldFuture::new(async move {
                    Ok(Some(FieldValue::list(
                        names.into_iter().map(FieldValue::value),
                    )))
                })
            },
        ));

        let mut connections = Vec::new();
        for op in &operations.queries {
            if let ResultType::Connection(node) = op.result
                && !connections.contains(&node)
            {
                connections.push(node);
            }
            query = query.field(query_field(Arc::clone(op), Arc::clone(&pipeline)));
        }

        let mut envelopes = Vec::new();
        let mut mutation = Object::new(MUTATION_ROOT);
        for op in &operations.mutations {
            if let ResultType::Connection(node) = op.result
                && !connections.contains(&node)
            {
                connections.push(node);
            }
            let (field, input, payload) = mutation_field(Arc::clone(op), Arc::clone(&pipeline));
            mutation = mutation.field(field);
            envelopes.push((input, payload));
        }

        let has_mutations = !operations.mutations.is_empty();
        let mut builder = Schema::build(QUERY_ROOT, has_mutations.then_some(MUTATION_ROOT), None)
            .register(json_scalar())
            .register(query);
        if has_mutations {
            builder = builder.register(mutation);
        }
        for (input, payload) in envelopes {
            builder = builder.register(input).register(payload);
        }
        if !connections.is_empty() {
            builder = builder.register(page_info_object());
        }
        for node in connections {
            for object in connection_objects(node) {
                builder = builder.register(object);
            }
        }

        let schema = builder
            .finish()
            .map_err(|e| Error::Schema(e.to_string()))?;
        info!(
            queries = operations.queries.len(),
            mutations = operations.mutations.len(),
            "graphql schema built"
        );
        Ok(schema)
    }
}

fn input_value(arg: &ArgSpec) -> InputValue {
    let name = scalar_name(arg.value_type);
    let ty = if arg.required {
        TypeRef::named_nn(name)
    } else {
        TypeRef::named(name)
    };
    let mut value = InputValue::new(arg.name.clone(), ty);
    if let Some(default) = &arg.default {
        value = value.default_value(json_to_gql_value(default));
    }
    value
}

/// Convert GraphQL arguments to JSON, skipping `skip`.
fn collect_args(object: &ObjectAccessor<'_>, skip: &str) -> Result<Map<String, Value>> {
    let mut raw = Map::new();
    for (name, value) in object.iter() {
        if name.as_str() == skip {
            continue;
        }
        let json = gql_value_to_json(value.as_value().clone())
            .map_err(|e| Error::invalid_argument(name.as_str(), e.to_string()))?;
        raw.insert(name.to_string(), json);
    }
    Ok(raw)
}

fn query_field(op: Arc<OperationDefinition>, pipeline: Arc<Pipeline>) -> Field {
    let resolver_op = Arc::clone(&op);
    let mut field = Field::new(op.name.clone(), result_type_ref(op.result), move |ctx| {
        let op = Arc::clone(&resolver_op);
        let pipeline = Arc::clone(&pipeline);
        FieldFuture::new(async move {
            let request = ctx.data::<RequestContext>()?;
            let args = collect_args(&ctx.args, "")
                .and_then(InvocationArgs::from_map)
                .map_err(Error::into_graphql)?;
            let outcome = pipeline
                .execute(args, request, &op)
                .await
                .map_err(Error::into_graphql)?;
            Ok(outcome_field_value(outcome))
        })
    });
    for arg in &op.args {
        field = field.argument(input_value(arg));
    }
    if let Some(description) = op.description() {
        field = field.description(description);
    }
    field
}

/// The mutation field plus its `Input` and `Payload` types.
fn mutation_field(
    op: Arc<OperationDefinition>,
    pipeline: Arc<Pipeline>,
) -> (Field, InputObject, Object) {
    let prefix = op.type_prefix();
    let input_name = format!("{prefix}Input");
    let payload_name = format!("{prefix}Payload");

    let mut input = op
        .args
        .iter()
        .fold(InputObject::new(input_name.clone()), |input, arg| {
            input.field(input_value(arg))
        });
    input = input.field(InputValue::new(
        CLIENT_MUTATION_ID,
        TypeRef::named(TypeRef::STRING),
    ));
    let payload = payload_object(payload_name.clone(), op.result);

    let resolver_op = Arc::clone(&op);
    let mut field = Field::new(op.name.clone(), TypeRef::named(payload_name), move |ctx| {
        let op = Arc::clone(&resolver_op);
        let pipeline = Arc::clone(&pipeline);
        FieldFuture::new(async move {
            let request = ctx.data::<RequestContext>()?;
            let input = ctx.args.try_get(MUTATION_INPUT_ARG)?.object()?;
            let client_mutation_id = input
                .get(CLIENT_MUTATION_ID)
                .and_then(|v| v.string().ok())
                .map(str::to_string);
            let args = collect_args(&input, CLIENT_MUTATION_ID)
                .and_then(InvocationArgs::from_map)
                .map_err(Error::into_graphql)?;
            let outcome = pipeline
                .execute(args, request, &op)
                .await
                .map_err(Error::into_graphql)?;
            Ok(Some(FieldValue::owned_any(MutationPayload {
                client_mutation_id,
                outcome,
            })))
        })
    })
    .argument(InputValue::new(
        MUTATION_INPUT_ARG,
        TypeRef::named_nn(input_name),
    ));
    if let Some(description) = op.description() {
        field = field.description(description);
    }
    (field, input, payload)
}
