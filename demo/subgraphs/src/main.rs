use subgraphs::{blog::counter::DEFAULT_COUNTER_INTERVAL, start_subgraphs_server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let counter_interval = std::env::var("COUNTER_INTERVAL")
        .ok()
        .and_then(|value| humantime::parse_duration(&value).ok())
        .unwrap_or(DEFAULT_COUNTER_INTERVAL);

    let (server_handle, _shutdown_tx, _addr_rx) = start_subgraphs_server(None, counter_interval);

    if let Err(err) = server_handle.await {
        tracing::error!("subgraphs server task failed: {}", err);
    }
}
