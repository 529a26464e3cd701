use std::time::Duration;

use futures::StreamExt;
use gateway::{configure_router, configure_shared_state};
use gateway_config::{load_config, parse_yaml_config, GatewayConfig};
use serde_json::{json, Value};
use subgraphs::start_subgraphs_server;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::info;

/// A gateway served on an ephemeral local port, stopped on drop.
pub struct TestGateway {
    pub base_url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl TestGateway {
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub async fn post(&self, query: &str, variables: Option<Value>) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.graphql_url())
            .json(&json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await
            .expect("gateway is unreachable")
    }

    pub async fn post_json(&self, query: &str) -> Value {
        let response = self.post(query, None).await;
        assert!(response.status().is_success(), "Expected 200 OK");

        response.json().await.expect("response is not JSON")
    }
}

pub async fn init_gateway_from_config_inline(
    config_yaml: &str,
) -> Result<TestGateway, Box<dyn std::error::Error>> {
    let config = parse_yaml_config(config_yaml.to_string())?;
    init_gateway_from_config(config).await
}

pub async fn init_gateway_from_config_file(
    config_path: &str,
) -> Result<TestGateway, Box<dyn std::error::Error>> {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(config_path);
    let config = load_config(Some(path.to_string_lossy().to_string()))?;
    init_gateway_from_config(config).await
}

pub async fn init_gateway_from_config(
    config: GatewayConfig,
) -> Result<TestGateway, Box<dyn std::error::Error>> {
    let shared_state = configure_shared_state(config).await?;
    let app = configure_router(shared_state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await;
    });

    info!("test gateway listening on {}", addr);

    Ok(TestGateway {
        base_url: format!("http://{}", addr),
        shutdown_tx: Some(shutdown_tx),
    })
}

/// The standalone blog service, used as the remote schema.
pub struct SubgraphsServer {
    pub graphql_url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Drop for SubgraphsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl SubgraphsServer {
    pub async fn start(counter_interval: Duration) -> Self {
        let (_server_handle, shutdown_tx, addr_rx) =
            start_subgraphs_server(Some(0), counter_interval);
        let (_, port) = addr_rx.await.expect("subgraphs server failed to bind");

        let health_check_url = format!("http://127.0.0.1:{}/health", port);
        loop {
            match reqwest::get(&health_check_url).await {
                Ok(response) if response.status().is_success() => break,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }

        Self {
            graphql_url: format!("http://127.0.0.1:{}/graphql", port),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn remote_config(&self, rules: &str) -> String {
        format!(
            "source:\n  source: remote\n  endpoint: {}\n  timeout: 5s\nfilter:\n{}",
            self.graphql_url, rules
        )
    }
}

/// Reads `next` events from a GraphQL over SSE response until `count` were seen.
pub async fn read_sse_events(response: reqwest::Response, count: usize) -> Vec<Value> {
    let mut body = response.bytes_stream();
    let mut buffer = String::new();
    let mut events = Vec::new();

    let read = async {
        while let Some(Ok(chunk)) = body.next().await {
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(end) = buffer.find("\n\n") {
                let raw_event: String = buffer.drain(..end + 2).collect();
                let is_next = raw_event.lines().any(|line| line == "event: next");
                let data = raw_event
                    .lines()
                    .find_map(|line| line.strip_prefix("data: "));

                if let (true, Some(data)) = (is_next, data) {
                    events.push(serde_json::from_str::<Value>(data).expect("event data is JSON"));
                }
                if events.len() == count {
                    return;
                }
            }
        }
    };

    tokio::time::timeout(Duration::from_secs(10), read)
        .await
        .expect("timed out waiting for subscription events");

    events
}
