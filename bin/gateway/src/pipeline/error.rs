use axum::{body::Body, extract::rejection::QueryRejection, response::IntoResponse};
use gateway_executor::{GraphQLError, OperationError};
use http::{header::CONTENT_TYPE, HeaderMap, HeaderName, Method, Response, StatusCode};
use serde_json::json;

use crate::pipeline::header::{
    response_content_type, RequestAccepts, APPLICATION_GRAPHQL_RESPONSE_JSON_STR,
};

#[derive(Debug)]
pub struct PipelineError {
    /// The client does not speak `application/graphql-response+json`, so GraphQL
    /// request errors are reported with a 200 status.
    pub accept_ok: bool,
    pub error: PipelineErrorVariant,
}

pub trait PipelineErrorFromAcceptHeader {
    fn new_pipeline_error(&self, error: PipelineErrorVariant) -> PipelineError;
}

impl PipelineErrorFromAcceptHeader for HeaderMap {
    fn new_pipeline_error(&self, error: PipelineErrorVariant) -> PipelineError {
        let accept_ok = !self.accepts_content_type(APPLICATION_GRAPHQL_RESPONSE_JSON_STR);
        PipelineError { accept_ok, error }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineErrorVariant {
    // HTTP-related errors
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedHttpMethod(Method),
    #[error("Header '{0}' has invalid value")]
    InvalidHeaderValue(HeaderName),
    #[error("Failed to read body: {0}")]
    FailedToReadBodyBytes(axum::Error),
    #[error("Content-Type header is missing")]
    MissingContentTypeHeader,
    #[error("Content-Type header is not supported")]
    UnsupportedContentType,

    // GET Specific pipeline errors
    #[error("Failed to deserialize query parameters: {0}")]
    GetInvalidQueryParams(QueryRejection),
    #[error("Missing query parameter: {0}")]
    GetMissingQueryParam(&'static str),
    #[error("Cannot perform mutations over GET")]
    MutationNotAllowedOverHttpGet,

    // GraphQL-specific errors
    #[error("Failed to parse GraphQL request payload")]
    FailedToParseBody(serde_json::Error),
    #[error("Failed to parse GraphQL variables JSON")]
    FailedToParseVariables(serde_json::Error),
    #[error("Failed to parse GraphQL extensions JSON")]
    FailedToParseExtensions(serde_json::Error),
    #[error("Subscriptions are only served as text/event-stream")]
    SubscriptionWithoutEventStream,
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl PipelineErrorVariant {
    pub fn graphql_error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedHttpMethod(_) | Self::MutationNotAllowedOverHttpGet => {
                "METHOD_NOT_ALLOWED"
            }
            Self::Operation(error) => error.error_code(),
            _ => "BAD_REQUEST",
        }
    }

    pub fn default_status_code(&self, prefer_ok: bool) -> StatusCode {
        match (self, prefer_ok) {
            (Self::UnsupportedHttpMethod(_), _) => StatusCode::METHOD_NOT_ALLOWED,
            (Self::MutationNotAllowedOverHttpGet, _) => StatusCode::METHOD_NOT_ALLOWED,
            (Self::FailedToReadBodyBytes(_), _) => StatusCode::BAD_REQUEST,
            (Self::InvalidHeaderValue(_), _) => StatusCode::BAD_REQUEST,
            (Self::GetInvalidQueryParams(_), _) => StatusCode::BAD_REQUEST,
            (Self::GetMissingQueryParam(_), _) => StatusCode::BAD_REQUEST,
            (Self::FailedToParseBody(_), _) => StatusCode::BAD_REQUEST,
            (Self::FailedToParseVariables(_), _) => StatusCode::BAD_REQUEST,
            (Self::FailedToParseExtensions(_), _) => StatusCode::BAD_REQUEST,
            (Self::MissingContentTypeHeader, _) => StatusCode::NOT_ACCEPTABLE,
            (Self::UnsupportedContentType, _) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            (Self::SubscriptionWithoutEventStream, _) => StatusCode::NOT_ACCEPTABLE,
            (Self::Operation(OperationError::Parse(_)), true) => StatusCode::OK,
            (Self::Operation(OperationError::Validation(_)), true) => StatusCode::OK,
            (Self::Operation(_), _) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn graphql_errors(&self) -> Vec<GraphQLError> {
        match self {
            Self::Operation(error) => error.graphql_errors(),
            other => vec![GraphQLError::with_code(
                other.to_string(),
                other.graphql_error_code(),
            )],
        }
    }
}

impl PipelineError {
    pub fn into_response_for(self, headers: &HeaderMap) -> Response<Body> {
        let content_type = response_content_type(headers);
        let mut response = self.into_response();
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        response
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response<Body> {
        let status = self.error.default_status_code(self.accept_ok);
        let error_response = json!({
            "errors": self.error.graphql_errors(),
        });

        (status, axum::Json(error_response)).into_response()
    }
}
