//! Gateway: HTTP server exposing the generated GraphQL schema.
//!
//! Lifecycle:
//! 1. Load + validate config
//! 2. Build the schema from the registered models and the configured ACL
//! 3. Bind the listener and serve `POST /graphql`, the playground and `/health`
//!
//! Every GraphQL call gets a fresh [`RequestContext`](remoql_graphql::RequestContext)
//! holding a snapshot of its headers; the tenancy collaborators are shared.

pub mod directory_model;
pub mod graphql_routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use {
    directory_model::DirectoryModel,
    server::{build_app, serve},
    state::GatewayState,
    telemetry::init_tracing,
};
