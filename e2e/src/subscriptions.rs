#[cfg(test)]
mod subscriptions_e2e_tests {
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::{json, Value};

    use crate::testkit::{
        init_gateway_from_config_inline, read_sse_events, SubgraphsServer, TestGateway,
    };

    const RULES: &str = r#"  - field: "*"
    expose: false
  - field: author
    expose: true
  - field: counter
    expose: true
"#;

    async fn subscribe(gateway: &TestGateway) -> reqwest::Response {
        reqwest::Client::new()
            .post(gateway.graphql_url())
            .header("accept", "text/event-stream")
            .json(&json!({"query": "subscription { counter { count countStr } }"}))
            .send()
            .await
            .unwrap()
    }

    fn expected_events() -> Vec<Value> {
        vec![
            json!({"data": {"counter": {"count": 0, "countStr": "Current count: 0"}}}),
            json!({"data": {"counter": {"count": 1, "countStr": "Current count: 1"}}}),
            json!({"data": {"counter": {"count": 2, "countStr": "Current count: 2"}}}),
        ]
    }

    #[tokio::test]
    async fn streams_the_local_counter() {
        let gateway = init_gateway_from_config_inline(&format!(
            "source:\n  source: local\n  counter_interval: 20ms\nfilter:\n{}",
            RULES
        ))
        .await
        .expect("failed to start gateway");

        let response = subscribe(&gateway).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));
        assert_eq!(read_sse_events(response, 3).await, expected_events());
    }

    #[tokio::test]
    async fn streams_the_remote_counter() {
        let subgraphs = SubgraphsServer::start(Duration::from_millis(20)).await;
        let gateway = init_gateway_from_config_inline(&subgraphs.remote_config(RULES))
            .await
            .expect("failed to start gateway");

        let response = subscribe(&gateway).await;

        assert_eq!(read_sse_events(response, 3).await, expected_events());
    }

    #[tokio::test]
    async fn subscriptions_require_an_event_stream() {
        let gateway = init_gateway_from_config_inline(&format!(
            "source:\n  source: local\nfilter:\n{}",
            RULES
        ))
        .await
        .expect("failed to start gateway");

        let response = gateway
            .post("subscription { counter { count } }", None)
            .await;

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn hidden_subscription_root_is_unsupported() {
        let gateway = init_gateway_from_config_inline(
            r#"
            filter:
              - field: "*"
                expose: false
              - field: author
                expose: true
            "#,
        )
        .await
        .expect("failed to start gateway");

        let response = subscribe(&gateway).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            "OPERATION_RESOLUTION_FAILURE"
        );
    }
}
