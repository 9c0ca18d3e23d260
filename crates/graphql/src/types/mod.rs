//! Output object types shared by generated operations.
//!
//! - `PageInfo` and one `<Scalar>Connection` / `<Scalar>Edge` pair per node
//!   type used by a list-returning operation.
//! - `<Operation>Input` / `<Operation>Payload` envelopes for mutations,
//!   correlating requests and responses through `clientMutationId`.

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, Object, TypeRef};

use {async_graphql::Value, remoql_model::ValueType};

use crate::{
    operation::ResultType,
    pagination::{Connection, Edge, PageInfo},
    pipeline::Outcome,
    scalars::{json_to_gql_value, scalar_name},
};

pub const PAGE_INFO: &str = "PageInfo";
pub const CLIENT_MUTATION_ID: &str = "clientMutationId";
pub const PAYLOAD_RESULT_FIELD: &str = "obj";

pub fn connection_type_name(node: ValueType) -> String {
    format!("{}Connection", scalar_name(node))
}

pub fn edge_type_name(node: ValueType) -> String {
    format!("{}Edge", scalar_name(node))
}

/// GraphQL type of an operation result.
pub fn result_type_ref(result: ResultType) -> TypeRef {
    match result {
        ResultType::Single(v) => TypeRef::named(scalar_name(v)),
        ResultType::Connection(v) => TypeRef::named(connection_type_name(v)),
    }
}

/// Field value of a pipeline outcome. `null` results resolve to `None`.
pub fn outcome_field_value<'a>(outcome: Outcome) -> Option<FieldValue<'a>> {
    match outcome {
        Outcome::Value(serde_json::Value::Null) => None,
        Outcome::Value(v) => Some(FieldValue::value(json_to_gql_value(&v))),
        Outcome::Connection(c) => Some(FieldValue::owned_any(c)),
    }
}

fn borrowed_outcome(outcome: &Outcome) -> Option<FieldValue<'_>> {
    match outcome {
        Outcome::Value(serde_json::Value::Null) => None,
        Outcome::Value(v) => Some(FieldValue::value(json_to_gql_value(v))),
        Outcome::Connection(c) => Some(FieldValue::borrowed_any(c)),
    }
}

pub fn page_info_object() -> Object {
    Object::new(PAGE_INFO)
        .description("Pagination state of a connection.")
        .field(Field::new(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(Some(FieldValue::value(info.has_next_page)))
                })
            },
        ))
        .field(Field::new(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(Some(FieldValue::value(info.has_previous_page)))
                })
            },
        ))
        .field(Field::new("startCursor", TypeRef::named(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                Ok(info.start_cursor.clone().map(FieldValue::value))
            })
        }))
        .field(Field::new("endCursor", TypeRef::named(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                Ok(info.end_cursor.clone().map(FieldValue::value))
            })
        }))
}

/// `<Scalar>Connection` and `<Scalar>Edge` for one node type.
pub fn connection_objects(node: ValueType) -> [Object; 2] {
    let edge_name = edge_type_name(node);

    let connection = Object::new(connection_type_name(node))
        .field(Field::new(
            "edges",
            TypeRef::named_nn_list_nn(edge_name.clone()),
            |ctx| {
                FieldFuture::new(async move {
                    let conn = ctx.parent_value.try_downcast_ref::<Connection>()?;
                    Ok(Some(FieldValue::list(
                        conn.edges.iter().map(|e| FieldValue::borrowed_any(e)),
                    )))
                })
            },
        ))
        .field(Field::new(
            "pageInfo",
            TypeRef::named_nn(PAGE_INFO),
            |ctx| {
                FieldFuture::new(async move {
                    let conn = ctx.parent_value.try_downcast_ref::<Connection>()?;
                    Ok(Some(FieldValue::borrowed_any(&conn.page_info)))
                })
            },
        ));

    let edge = Object::new(edge_name)
        .field(Field::new("node", TypeRef::named(scalar_name(node)), |ctx| {
            FieldFuture::new(async move {
                let edge = ctx.parent_value.try_downcast_ref::<Edge>()?;
                Ok(match &edge.node {
                    serde_json::Value::Null => None,
                    v => Some(FieldValue::value(json_to_gql_value(v))),
                })
            })
        }))
        .field(Field::new("cursor", TypeRef::named_nn(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let edge = ctx.parent_value.try_downcast_ref::<Edge>()?;
                Ok(Some(FieldValue::value(edge.cursor.clone())))
            })
        }));

    [connection, edge]
}

/// What a mutation field resolves to before its payload fields run.
pub struct MutationPayload {
    pub client_mutation_id: Option<String>,
    pub outcome: Outcome,
}

pub fn payload_object(name: String, result: ResultType) -> Object {
    Object::new(name)
        .field(Field::new(
            CLIENT_MUTATION_ID,
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let payload = ctx.parent_value.try_downcast_ref::<MutationPayload>()?;
                    Ok(payload
                        .client_mutation_id
                        .clone()
                        .map(|id| FieldValue::value(Value::String(id))))
                })
            },
        ))
        .field(Field::new(
            PAYLOAD_RESULT_FIELD,
            result_type_ref(result),
            |ctx| {
                FieldFuture::new(async move {
                    let payload = ctx.parent_value.try_downcast_ref::<MutationPayload>()?;
                    Ok(borrowed_outcome(&payload.outcome))
                })
            },
        ))
}
