#[cfg(test)]
mod remote_schema_e2e_tests {
    use std::time::Duration;

    use serde_json::json;

    use crate::testkit::{init_gateway_from_config_inline, SubgraphsServer};

    const RULES: &str = r#"  - field: "*"
    expose: false
  - field: author
    expose: true
  - field: downvotePost
    expose: true
"#;

    #[tokio::test]
    async fn delegates_to_the_introspected_service() {
        let subgraphs = SubgraphsServer::start(Duration::from_secs(2)).await;
        let gateway = init_gateway_from_config_inline(&subgraphs.remote_config(RULES))
            .await
            .expect("failed to start gateway");

        let body = gateway
            .post_json("{ author(id: 3) { firstName posts { title } } }")
            .await;

        assert_eq!(
            body,
            json!({"data": {"author": {
                "firstName": "Mikhail",
                "posts": [{"title": "Launchpad is Cool"}]
            }}})
        );
    }

    #[tokio::test]
    async fn remote_field_errors_keep_their_path() {
        let subgraphs = SubgraphsServer::start(Duration::from_secs(2)).await;
        let gateway = init_gateway_from_config_inline(&subgraphs.remote_config(RULES))
            .await
            .expect("failed to start gateway");

        let body = gateway
            .post_json("mutation { downvotePost(postId: 999) { id } }")
            .await;

        assert_eq!(body["data"], json!({"downvotePost": null}));
        assert_eq!(body["errors"][0]["message"], "Couldn't find post with id 999");
        assert_eq!(body["errors"][0]["path"], json!(["downvotePost"]));
    }

    #[tokio::test]
    async fn hides_remote_fields() {
        let subgraphs = SubgraphsServer::start(Duration::from_secs(2)).await;
        let gateway = init_gateway_from_config_inline(&subgraphs.remote_config(RULES))
            .await
            .expect("failed to start gateway");

        let rejected = gateway.post_json("{ posts { id } }").await;
        let introspected = gateway
            .post_json("{ __schema { mutationType { fields { name } } } }")
            .await;

        assert_eq!(
            rejected["errors"][0]["extensions"]["code"],
            "GRAPHQL_VALIDATION_FAILED"
        );
        assert_eq!(
            introspected,
            json!({"data": {"__schema": {"mutationType": {"fields": [{"name": "downvotePost"}]}}}})
        );
    }

    #[tokio::test]
    async fn unreachable_remote_fails_startup() {
        let error = init_gateway_from_config_inline(
            r#"
            source:
              source: remote
              endpoint: http://127.0.0.1:9/graphql
              timeout: 1s
            "#,
        )
        .await
        .err()
        .expect("gateway should not start");

        assert!(error
            .to_string()
            .starts_with("Failed to load the source schema: Failed to introspect the remote schema"));
    }
}
