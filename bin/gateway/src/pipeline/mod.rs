use std::sync::Arc;

use axum::{body::Body, extract::State, response::IntoResponse};
use gateway_executor::{ExecutionRequest, PreparedOperation};
use gateway_schema_filter::OperationKind;
use http::{header::CONTENT_TYPE, HeaderMap, Method, Request, Response};
use tracing::{debug, error};

use crate::{
    pipeline::{
        error::{PipelineError, PipelineErrorFromAcceptHeader, PipelineErrorVariant},
        graphql_request_params::get_execution_request,
        header::{response_content_type, RequestAccepts, TEXT_EVENT_STREAM_STR},
        sse::event_stream_response,
    },
    shared_state::GatewaySharedState,
};

pub mod error;
pub mod graphql_request_params;
pub mod header;
pub mod sse;

pub async fn graphql_request_handler(
    State(state): State<Arc<GatewaySharedState>>,
    req: Request<Body>,
) -> Response<Body> {
    let headers = req.headers().clone();

    match execute_pipeline(req, &headers, &state).await {
        Ok(response) => response,
        Err(err) => {
            error!("request pipeline error: {}", err.error);
            debug!("{:?}", err.error);

            err.into_response_for(&headers)
        }
    }
}

async fn execute_pipeline(
    req: Request<Body>,
    headers: &HeaderMap,
    state: &GatewaySharedState,
) -> Result<Response<Body>, PipelineError> {
    let method = req.method().clone();
    let execution_request: ExecutionRequest = get_execution_request(req)
        .await
        .map_err(|err| headers.new_pipeline_error(err))?;

    debug!(
        operation_name = execution_request.operation_name.as_deref().unwrap_or(""),
        "received GraphQL request"
    );

    let prepared: PreparedOperation = state
        .schema
        .prepare(execution_request)
        .map_err(|err| headers.new_pipeline_error(err.into()))?;

    match prepared.kind {
        OperationKind::Mutation if method == Method::GET => Err(headers
            .new_pipeline_error(PipelineErrorVariant::MutationNotAllowedOverHttpGet)),
        OperationKind::Subscription => {
            if !headers.accepts_content_type(TEXT_EVENT_STREAM_STR) {
                return Err(headers
                    .new_pipeline_error(PipelineErrorVariant::SubscriptionWithoutEventStream));
            }

            let results = state.schema.subscribe(prepared).await;
            Ok(event_stream_response(results))
        }
        OperationKind::Query | OperationKind::Mutation => {
            let result = state.schema.execute_prepared(prepared).await;

            let mut response = axum::Json(result).into_response();
            response
                .headers_mut()
                .insert(CONTENT_TYPE, response_content_type(headers));
            Ok(response)
        }
    }
}
