pub mod error;
mod http_utils;
pub mod logger;
mod pipeline;
mod shared_state;
pub mod source;

use std::sync::Arc;

use axum::{
    body::Body,
    http::Method,
    routing::{any, get},
    Router,
};
use gateway_config::GatewayConfig;
use gateway_executor::FilteredSchema;
use gateway_schema_filter::FilterRules;
use http::Request;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug_span, info};

use crate::{
    error::StartupError,
    http_utils::{
        probes::health_check_handler,
        request_id::{RequestIdGenerator, REQUEST_ID_HEADER_NAME},
    },
    pipeline::graphql_request_handler,
    source::load_source_schema,
};

pub use crate::shared_state::GatewaySharedState;

/// Loads the source schema and applies the configured visibility rules.
pub async fn configure_shared_state(
    config: GatewayConfig,
) -> Result<Arc<GatewaySharedState>, StartupError> {
    let source = load_source_schema(&config.source).await?;
    let rules: FilterRules = config.filter.iter().collect();
    let schema = FilteredSchema::new(Arc::new(source), &rules)?;

    let exposure = schema.exposure();
    info!(
        source = config.source.kind(),
        query = %exposure.query.join(", "),
        mutation = %exposure.mutation.join(", "),
        subscription = %exposure.subscription.join(", "),
        "filtered schema is ready"
    );

    Ok(GatewaySharedState::new(schema, config))
}

pub fn configure_router(shared_state: Arc<GatewaySharedState>) -> Router {
    let graphql_path = shared_state.config.graphql_path().to_string();

    Router::new()
        .route(&graphql_path, any(graphql_request_handler))
        .route("/health", get(health_check_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    REQUEST_ID_HEADER_NAME.clone(),
                    RequestIdGenerator,
                ))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .extensions()
                            .get::<RequestId>()
                            .and_then(|v| v.header_value().to_str().ok())
                            .unwrap_or_default();

                        debug_span!(
                            "http_request",
                            request_id = %request_id,
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER_NAME.clone())),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(vec![
                    axum::http::header::ACCEPT,
                    axum::http::header::CONTENT_TYPE,
                ])
                .allow_origin(tower_http::cors::Any),
        )
        .with_state(shared_state)
}
