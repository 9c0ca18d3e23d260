//! GraphQL surface for remote models.
//!
//! Every model registered with the schema contributes one query per static
//! read method (`GET`/`HEAD`) and one mutation per static write method. Each
//! generated resolver runs the same pipeline before reaching the model:
//! option normalization, organization resolution, then access control.
//!
//! The gateway crate serves the schema over HTTP and attaches a
//! [`RequestContext`] to every request. This crate only builds the schema and
//! the resolver pipeline.

pub mod context;
pub mod error;
pub mod operation;
pub mod pagination;
pub mod pipeline;
pub mod scalars;
pub mod schema;
pub mod types;

pub use {
    context::RequestContext,
    error::{Error, Result},
    operation::{OperationDefinition, OperationSet, operation_name},
    pagination::{Connection, ConnectionArgs, Edge, PageInfo},
    pipeline::{
        CheckAccess, InvocationArgs, NormalizeOptions, Outcome, Pipeline, PipelineState,
        ResolveOrganization, Step,
    },
    schema::{DEFAULT_TENANT_MODEL, RemoqlSchema, SchemaBuilder, build_schema},
};
