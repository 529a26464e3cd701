pub mod blog;
mod graphql_with_sse;

use std::{env::var, net::SocketAddr, time::Duration};

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tokio::{
    net::TcpListener,
    sync::oneshot::{self, Receiver, Sender},
    task::JoinHandle,
};
use tracing::info;

pub use graphql_with_sse::GraphQL;

async fn health_check_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Serves the blog schema on `/graphql` until the returned sender fires.
///
/// Port 0 picks an ephemeral port; the bound address is sent back through the
/// returned receiver.
pub fn start_subgraphs_server(
    port: Option<u16>,
    counter_interval: Duration,
) -> (JoinHandle<()>, Sender<()>, Receiver<(String, u16)>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (addr_tx, addr_rx) = oneshot::channel::<(String, u16)>();
    let host = var("HOST").unwrap_or("0.0.0.0".to_owned());
    let port_input = port.unwrap_or_else(|| {
        var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(4200)
    });

    let app = Router::new()
        .route_service(
            "/graphql",
            GraphQL::new(blog::get_schema(counter_interval)),
        )
        .route("/health", get(health_check_handler));

    let server_handle = tokio::spawn(async move {
        let listener = match TcpListener::bind(&format!("{}:{}", host, port_input)).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!("failed to bind subgraphs server: {}", err);
                return;
            }
        };

        let Ok(assigned_addr): Result<SocketAddr, _> = listener.local_addr() else {
            return;
        };
        let assigned_host = assigned_addr.ip().to_string();
        let assigned_port = assigned_addr.port();

        info!(
            "Starting subgraphs server on http://{}:{}",
            assigned_host, assigned_port
        );

        let _ = addr_tx.send((assigned_host, assigned_port));

        if let Err(err) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                info!("Graceful shutdown signal received.");
            })
            .await
        {
            tracing::error!("subgraphs server failed: {}", err);
        }
    });

    (server_handle, shutdown_tx, addr_rx)
}
