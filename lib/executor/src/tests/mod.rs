use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use gateway_schema_filter::{FilterRules, OperationKind, SchemaFilterError};
use serde_json::json;

use crate::{
    error::{FilteredSchemaError, OperationError},
    executors::{common::SchemaExecutor, local::LocalSchemaExecutor},
    filtered::FilteredSchema,
    request::ExecutionRequest,
    source::SourceSchema,
};

const LOCAL_RULES: [(&str, bool); 3] = [("*", false), ("author", true), ("upvotePost", true)];

fn blog_source() -> Arc<SourceSchema> {
    let schema = subgraphs::blog::get_schema(Duration::from_millis(10));
    Arc::new(SourceSchema::local(LocalSchemaExecutor::new(schema)).unwrap())
}

fn filtered_blog(rules: &[(&str, bool)]) -> FilteredSchema {
    let rules: FilterRules = rules.iter().copied().collect();
    FilteredSchema::new(blog_source(), &rules).unwrap()
}

#[test]
fn local_rules_expose_author_and_upvote() {
    let schema = filtered_blog(&LOCAL_RULES);
    let exposure = schema.exposure();

    assert_eq!(exposure.query, vec!["author"]);
    assert_eq!(exposure.mutation, vec!["upvotePost"]);
    assert!(exposure.subscription.is_empty());
    assert!(exposure.types.contains(&"Author".to_string()));
    assert!(exposure.types.contains(&"Post".to_string()));
    assert!(!exposure.types.contains(&"Counter".to_string()));

    assert!(schema.supports(OperationKind::Mutation));
    assert!(!schema.supports(OperationKind::Subscription));
}

#[test]
fn nothing_exposed_is_rejected() {
    let rules: FilterRules = [("*", false)].into_iter().collect();
    let error = FilteredSchema::new(blog_source(), &rules).err().unwrap();

    assert!(matches!(
        error,
        FilteredSchemaError::Filter(SchemaFilterError::EmptyExposure { .. })
    ));
}

#[test]
fn unknown_selectors_are_rejected() {
    let rules: FilterRules = [("*", false), ("author", true), ("comments", true)]
        .into_iter()
        .collect();
    let error = FilteredSchema::new(blog_source(), &rules).err().unwrap();

    insta::assert_snapshot!(error, @"Visibility rules reference unknown fields or types: comments");
}

#[tokio::test]
async fn hidden_root_fields_fail_validation() {
    let schema = filtered_blog(&LOCAL_RULES);

    let result = schema
        .execute(ExecutionRequest::new("{ posts { id } }"))
        .await;

    assert_eq!(result.data, None);
    let errors = result.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), Some("GRAPHQL_VALIDATION_FAILED"));
    assert!(errors[0].message.contains("posts"));
}

#[tokio::test]
async fn hidden_mutations_fail_validation() {
    let schema = filtered_blog(&LOCAL_RULES);

    let error = schema
        .prepare(ExecutionRequest::new(
            "mutation { downvotePost(postId: 1) { id } }",
        ))
        .unwrap_err();

    assert!(matches!(error, OperationError::Validation(_)));
}

#[tokio::test]
async fn removed_subscription_root_is_unsupported() {
    let schema = filtered_blog(&LOCAL_RULES);

    let error = schema
        .prepare(ExecutionRequest::new("subscription { counter { count } }"))
        .unwrap_err();

    assert_eq!(error.error_code(), "OPERATION_RESOLUTION_FAILURE");
    insta::assert_snapshot!(error, @"Schema is not configured to execute subscription operation");
}

#[tokio::test]
async fn parse_failures_are_reported() {
    let schema = filtered_blog(&LOCAL_RULES);

    let result = schema.execute(ExecutionRequest::new("{ author(id: 1) {")).await;

    assert_eq!(
        result.errors.unwrap()[0].code(),
        Some("GRAPHQL_PARSE_FAILED")
    );
}

#[tokio::test]
async fn delegation_matches_the_unfiltered_schema() {
    let source = blog_source();
    let rules: FilterRules = LOCAL_RULES.into_iter().collect();
    let schema = FilteredSchema::new(source.clone(), &rules).unwrap();
    let query = "query AuthorWithPosts($id: Int!) { author(id: $id) { firstName posts { title votes author { lastName } } } }";
    let request = ExecutionRequest::new(query)
        .with_operation_name("AuthorWithPosts")
        .with_variables(json!({"id": 1}).as_object().cloned().unwrap());

    let filtered = schema.execute(request.clone()).await;
    let direct = source.executor.execute(request).await.unwrap();

    assert_eq!(filtered, direct);
    assert_eq!(
        filtered.data,
        Some(json!({"author": {
            "firstName": "Tom",
            "posts": [{"title": "Introduction to GraphQL", "votes": 2, "author": {"lastName": "Coleman"}}]
        }}))
    );
}

#[tokio::test]
async fn upvote_through_the_filtered_schema() {
    let schema = filtered_blog(&LOCAL_RULES);

    let result = schema
        .execute(ExecutionRequest::new(
            "mutation { upvotePost(postId: 1) { id votes } }",
        ))
        .await;

    assert_eq!(
        result.data,
        Some(json!({"upvotePost": {"id": 1, "votes": 3}}))
    );
}

#[tokio::test]
async fn unknown_post_is_a_field_error_with_a_path() {
    let schema = filtered_blog(&[("*", true)]);

    let result = schema
        .execute(ExecutionRequest::new(
            "mutation { downvotePost(postId: 999) { id } }",
        ))
        .await;

    assert_eq!(result.data, Some(json!({"downvotePost": null})));
    let errors = result.errors.unwrap();
    assert_eq!(errors[0].message, "Couldn't find post with id 999");
    assert_eq!(errors[0].path, Some(vec![json!("downvotePost")]));
}

#[tokio::test]
async fn unknown_post_only_nulls_its_own_alias() {
    let schema = filtered_blog(&[("*", true)]);

    let result = schema
        .execute(ExecutionRequest::new(
            "mutation { bad: downvotePost(postId: 999) { id } good: upvotePost(postId: 1) { id votes } }",
        ))
        .await;

    assert_eq!(
        result.data,
        Some(json!({"bad": null, "good": {"id": 1, "votes": 3}}))
    );
    let errors = result.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, Some(vec![json!("bad")]));
    assert_eq!(errors[0].code(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn closure_types_validate_and_hidden_types_do_not() {
    let schema = filtered_blog(&LOCAL_RULES);

    let nested = schema
        .execute(ExecutionRequest::new(
            "{ author(id: 1) { posts { title votes author { firstName } } } }",
        ))
        .await;
    let hidden = schema
        .execute(ExecutionRequest::new(
            "{ author(id: 1) { ... on Counter { count } } }",
        ))
        .await;

    assert_eq!(nested.errors, None);
    assert_eq!(
        nested.data,
        Some(json!({"author": {"posts": [
            {"title": "Introduction to GraphQL", "votes": 2, "author": {"firstName": "Tom"}}
        ]}}))
    );
    let errors = hidden.errors.unwrap();
    assert_eq!(errors[0].code(), Some("GRAPHQL_VALIDATION_FAILED"));
    assert!(errors
        .iter()
        .any(|error| error.message.contains(r#"Unknown type "Counter""#)));
}

#[tokio::test]
async fn introspection_hides_filtered_fields_and_types() {
    let schema = filtered_blog(&LOCAL_RULES);

    let result = schema
        .execute(ExecutionRequest::new(
            "{ __schema { queryType { fields { name } } mutationType { fields { name } } subscriptionType { name } types { name } } }",
        ))
        .await;

    assert_eq!(result.errors, None);
    let data = result.data.unwrap();
    assert_eq!(
        data["__schema"]["queryType"],
        json!({"fields": [{"name": "author"}]})
    );
    assert_eq!(
        data["__schema"]["mutationType"],
        json!({"fields": [{"name": "upvotePost"}]})
    );
    assert_eq!(data["__schema"]["subscriptionType"], json!(null));

    let type_names: Vec<&str> = data["__schema"]["types"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(type_names.contains(&"Author"));
    assert!(type_names.contains(&"Post"));
    assert!(!type_names.contains(&"Counter"));
    assert!(!type_names.contains(&"Subscription"));
}

#[tokio::test]
async fn mixed_introspection_keeps_selection_order() {
    let schema = filtered_blog(&LOCAL_RULES);

    let result = schema
        .execute(ExecutionRequest::new(
            r#"{ __typename writer: author(id: 2) { lastName } __type(name: "Counter") { name } }"#,
        ))
        .await;

    assert_eq!(result.errors, None);
    let data = result.data.unwrap();
    let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["__typename", "writer", "__type"]);
    assert_eq!(
        data,
        json!({
            "__typename": "Query",
            "writer": {"lastName": "Stubailo"},
            "__type": null
        })
    );
}

#[tokio::test]
async fn subscriptions_are_streamed_from_the_source() {
    let schema = filtered_blog(&[("*", false), ("author", true), ("counter", true)]);
    let prepared = schema
        .prepare(ExecutionRequest::new(
            "subscription { counter { count countStr } }",
        ))
        .unwrap();
    assert_eq!(prepared.kind, OperationKind::Subscription);

    let events: Vec<_> = schema.subscribe(prepared).await.take(2).collect().await;

    assert_eq!(
        events[0].data,
        Some(json!({"counter": {"count": 0, "countStr": "Current count: 0"}}))
    );
    assert_eq!(
        events[1].data,
        Some(json!({"counter": {"count": 1, "countStr": "Current count: 1"}}))
    );
}
