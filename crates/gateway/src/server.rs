use std::sync::Arc;

use {
    anyhow::Context,
    axum::{
        Router,
        routing::{get, post},
    },
    tokio::net::TcpListener,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{info, warn},
};

use crate::{
    graphql_routes::{graphql_handler, health_handler, playground_handler},
    state::GatewayState,
};

/// Router serving the GraphQL route, the optional playground and `/health`.
pub fn build_app(state: Arc<GatewayState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route(&state.graphql_path, post(graphql_handler));
    if let Some(playground) = &state.playground_path {
        app = app.route(playground, get(playground_handler));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: Arc<GatewayState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        address = %listener.local_addr()?,
        graphql = %state.graphql_path,
        playground = ?state.playground_path,
        "gateway listening"
    );
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
