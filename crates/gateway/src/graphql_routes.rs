//! GraphQL HTTP handlers for the gateway.
//!
//! `POST {graphql.path}` executes queries and mutations; `GET
//! {graphql.playground_path}` serves GraphiQL pointed at the GraphQL route.

use std::sync::Arc;

use {
    async_graphql::http::GraphiQLSource,
    async_graphql_axum::{GraphQLRequest, GraphQLResponse},
    axum::{
        Json,
        extract::State,
        http::HeaderMap,
        response::{Html, IntoResponse},
    },
    tracing::debug,
};

use crate::state::GatewayState;

/// Execute one GraphQL request with a context built from its headers.
pub async fn graphql_handler(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner();
    debug!(operation = ?request.operation_name, "graphql request");
    let ctx = state.request_context(headers);
    state.schema.execute(request.data(ctx)).await.into()
}

pub async fn playground_handler(State(state): State<Arc<GatewayState>>) -> Html<String> {
    Html(GraphiQLSource::build().endpoint(&state.graphql_path).finish())
}

pub async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
    }))
}
