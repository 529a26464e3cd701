#[cfg(test)]
mod local_schema_e2e_tests {
    use serde_json::json;

    use crate::testkit::{init_gateway_from_config_file, init_gateway_from_config_inline};

    const LOCAL_CONFIG: &str = r#"
        source:
          source: local
        filter:
          - field: "*"
            expose: false
          - field: author
            expose: true
          - field: upvotePost
            expose: true
    "#;

    #[tokio::test]
    async fn resolves_exposed_fields() {
        let gateway = init_gateway_from_config_inline(LOCAL_CONFIG)
            .await
            .expect("failed to start gateway");

        let body = gateway
            .post_json("{ author(id: 2) { firstName lastName posts { title votes } } }")
            .await;

        assert_eq!(
            body,
            json!({"data": {"author": {
                "firstName": "Sashko",
                "lastName": "Stubailo",
                "posts": [
                    {"title": "Welcome to Meteor", "votes": 3},
                    {"title": "Advanced GraphQL", "votes": 1}
                ]
            }}})
        );
    }

    #[tokio::test]
    async fn rejects_hidden_fields() {
        let gateway = init_gateway_from_config_inline(LOCAL_CONFIG)
            .await
            .expect("failed to start gateway");

        let body = gateway.post_json("{ posts { id } }").await;

        assert_eq!(body["data"], json!(null));
        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            json!("GRAPHQL_VALIDATION_FAILED")
        );
    }

    #[tokio::test]
    async fn upvote_mutates_the_store() {
        let gateway = init_gateway_from_config_inline(LOCAL_CONFIG)
            .await
            .expect("failed to start gateway");

        let first = gateway
            .post_json("mutation { upvotePost(postId: 1) { votes } }")
            .await;
        let second = gateway
            .post_json("mutation { upvotePost(postId: 1) { votes } }")
            .await;

        assert_eq!(first, json!({"data": {"upvotePost": {"votes": 3}}}));
        assert_eq!(second, json!({"data": {"upvotePost": {"votes": 4}}}));
    }

    #[tokio::test]
    async fn introspection_only_shows_the_filtered_schema() {
        let gateway = init_gateway_from_config_inline(LOCAL_CONFIG)
            .await
            .expect("failed to start gateway");

        let body = gateway
            .post_json(
                r#"{
                    __schema { queryType { fields { name } } subscriptionType { name } }
                    Counter: __type(name: "Counter") { name }
                    Post: __type(name: "Post") { fields { name } }
                }"#,
            )
            .await;

        assert_eq!(
            body,
            json!({"data": {
                "__schema": {
                    "queryType": {"fields": [{"name": "author"}]},
                    "subscriptionType": null
                },
                "Counter": null,
                "Post": {"fields": [
                    {"name": "id"},
                    {"name": "title"},
                    {"name": "author"},
                    {"name": "votes"}
                ]}
            }})
        );
    }

    #[tokio::test]
    async fn wildcard_only_rules_fail_startup() {
        let error = init_gateway_from_config_inline(
            r#"
            filter:
              - field: "*"
                expose: false
            "#,
        )
        .await
        .err()
        .expect("gateway should not start");

        insta::assert_snapshot!(
            error.to_string(),
            @"Failed to build the filtered schema: Root type 'Query' exposes no fields after filtering"
        );
    }

    #[tokio::test]
    async fn unknown_selectors_fail_startup() {
        let error = init_gateway_from_config_inline(
            r#"
            filter:
              - field: "*"
                expose: false
              - field: author
                expose: true
              - field: comments
                expose: true
              - field: Tag
                expose: true
            "#,
        )
        .await
        .err()
        .expect("gateway should not start");

        insta::assert_snapshot!(
            error.to_string(),
            @"Failed to build the filtered schema: Visibility rules reference unknown fields or types: Tag, comments"
        );
    }

    #[tokio::test]
    async fn serves_the_shipped_local_config() {
        let gateway = init_gateway_from_config_file("../configs/local.gateway.config.yaml")
            .await
            .expect("failed to start gateway");

        let body = gateway
            .post_json("mutation { upvotePost(postId: 4) { id votes } }")
            .await;

        assert_eq!(body, json!({"data": {"upvotePost": {"id": 4, "votes": 8}}}));
    }
}
