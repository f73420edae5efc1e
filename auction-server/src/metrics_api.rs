//! Metrics Server
//!
//! Serves the auction counters, the close delay histogram and the store query
//! timings over /metrics in OpenMetrics format.
use {
    crate::{
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::ServerState,
    },
    anyhow::{
        Context,
        Result,
    },
    axum::{
        extract::State,
        routing::get,
        Router,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
};

async fn render_metrics(State(server_state): State<Arc<ServerState>>) -> String {
    server_state.metrics_recorder.render()
}

fn metrics_router(server_state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(server_state)
}

pub async fn start_metrics(run_options: RunOptions, server_state: Arc<ServerState>) -> Result<()> {
    let metrics_addr = run_options.server.metrics_addr;
    tracing::info!(addr = %metrics_addr, "Starting Metrics Server...");

    let listener = tokio::net::TcpListener::bind(metrics_addr)
        .await
        .with_context(|| format!("Failed to bind metrics server to {}", metrics_addr))?;
    axum::serve(listener, metrics_router(server_state))
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down metrics server...");
        })
        .await?;
    Ok(())
}
