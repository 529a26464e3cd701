#[cfg(test)]
mod http_e2e_tests {
    use reqwest::{header::CONTENT_TYPE, StatusCode};
    use serde_json::{json, Value};

    use crate::testkit::{init_gateway_from_config_inline, TestGateway};

    async fn start() -> TestGateway {
        init_gateway_from_config_inline(
            r#"
            filter:
              - field: "*"
                expose: false
              - field: author
                expose: true
              - field: upvotePost
                expose: true
            "#,
        )
        .await
        .expect("failed to start gateway")
    }

    #[tokio::test]
    async fn health_check() {
        let gateway = start().await;

        let response = reqwest::get(format!("{}/health", gateway.base_url))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn queries_over_get() {
        let gateway = start().await;

        let response = reqwest::Client::new()
            .get(gateway.graphql_url())
            .query(&[
                ("query", "query Author($id: Int!) { author(id: $id) { lastName } }"),
                ("operationName", "Author"),
                ("variables", r#"{"id":3}"#),
            ])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/json"
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"data": {"author": {"lastName": "Novikov"}}}));
    }

    #[tokio::test]
    async fn mutations_over_get_are_not_allowed() {
        let gateway = start().await;

        let response = reqwest::Client::new()
            .get(gateway.graphql_url())
            .query(&[("query", "mutation { upvotePost(postId: 1) { votes } }")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({"errors": [{
                "message": "Cannot perform mutations over GET",
                "extensions": {"code": "METHOD_NOT_ALLOWED"}
            }]})
        );
    }

    #[tokio::test]
    async fn unsupported_methods_are_rejected() {
        let gateway = start().await;

        let response = reqwest::Client::new()
            .put(gateway.graphql_url())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["extensions"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let gateway = start().await;

        let response = reqwest::Client::new()
            .post(gateway.graphql_url())
            .header(CONTENT_TYPE, "application/json")
            .body("{\"query\": ")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn parse_errors_follow_the_accept_header() {
        let gateway = start().await;
        let client = reqwest::Client::new();

        let plain_json = gateway.post("{ author(id: 1) {", None).await;
        let graphql_response_json = client
            .post(gateway.graphql_url())
            .header("accept", "application/graphql-response+json")
            .json(&json!({"query": "{ author(id: 1) {"}))
            .send()
            .await
            .unwrap();

        assert_eq!(plain_json.status(), StatusCode::OK);
        assert_eq!(graphql_response_json.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            graphql_response_json.headers()[CONTENT_TYPE],
            "application/graphql-response+json"
        );
        let body: Value = graphql_response_json.json().await.unwrap();
        assert_eq!(body["errors"][0]["extensions"]["code"], "GRAPHQL_PARSE_FAILED");
    }

    #[tokio::test]
    async fn unknown_operation_names_fail_resolution() {
        let gateway = start().await;

        let response = reqwest::Client::new()
            .post(gateway.graphql_url())
            .json(&json!({
                "query": "query A { author(id: 1) { id } } query B { author(id: 2) { id } }",
                "operationName": "C"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            "OPERATION_RESOLUTION_FAILURE"
        );
    }

    #[tokio::test]
    async fn assigns_request_ids() {
        let gateway = start().await;

        let generated = gateway.post("{ author(id: 1) { id } }", None).await;
        let propagated = reqwest::Client::new()
            .post(gateway.graphql_url())
            .header("x-request-id", "e2e-request")
            .json(&json!({"query": "{ author(id: 1) { id } }"}))
            .send()
            .await
            .unwrap();

        assert!(generated.headers().contains_key("x-request-id"));
        assert_eq!(propagated.headers()["x-request-id"], "e2e-request");
    }
}
