//! The `JSON` scalar and value conversion between GraphQL and model values.
//!
//! Models speak `serde_json::Value`; the dynamic schema speaks
//! `async_graphql::Value`. Structured model results travel as `JSON`.

use async_graphql::{
    Name, Number, Value,
    dynamic::{Scalar, TypeRef},
};

use remoql_model::ValueType;

pub const JSON_SCALAR: &str = "JSON";

#[derive(Debug, thiserror::Error)]
pub enum ScalarError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported value type")]
    UnsupportedValueType,
}

/// Scalar that passes arbitrary JSON through unchanged.
pub fn json_scalar() -> Scalar {
    Scalar::new(JSON_SCALAR).description("Arbitrary JSON value (model instances, filters, options).")
}

/// GraphQL type name for a model value type.
pub fn scalar_name(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::String => TypeRef::STRING,
        ValueType::Int => TypeRef::INT,
        ValueType::Float => TypeRef::FLOAT,
        ValueType::Boolean => TypeRef::BOOLEAN,
        ValueType::Id => TypeRef::ID,
        ValueType::Json => JSON_SCALAR,
    }
}

pub fn gql_value_to_json(v: Value) -> Result<serde_json::Value, ScalarError> {
    match v {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Number(n) => Ok(serde_json::to_value(n)?),
        Value::String(s) => Ok(serde_json::Value::String(s)),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(b)),
        Value::Enum(e) => Ok(serde_json::Value::String(e.to_string())),
        Value::List(l) => {
            let items: Result<Vec<serde_json::Value>, _> =
                l.into_iter().map(gql_value_to_json).collect();
            Ok(serde_json::Value::Array(items?))
        },
        Value::Object(m) => {
            let map: Result<serde_json::Map<String, serde_json::Value>, _> = m
                .into_iter()
                .map(|(k, v)| gql_value_to_json(v).map(|jv| (k.to_string(), jv)))
                .collect();
            Ok(serde_json::Value::Object(map?))
        },
        Value::Binary(_) => Err(ScalarError::UnsupportedValueType),
    }
}

pub fn json_to_gql_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(a) => Value::List(a.iter().map(json_to_gql_value).collect()),
        serde_json::Value::Object(m) => Value::Object(
            m.iter()
                .map(|(k, v)| (Name::new(k), json_to_gql_value(v)))
                .collect(),
        ),
    }
}
