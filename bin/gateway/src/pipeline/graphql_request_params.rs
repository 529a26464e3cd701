use axum::body::{to_bytes, Body};
use axum::extract::Query;
use gateway_executor::ExecutionRequest;
use http::{Method, Request};
use serde::Deserialize;
use tracing::{trace, warn};

use crate::pipeline::error::PipelineErrorVariant;
use crate::pipeline::header::assert_json_content_type;

static MAX_BODY_SIZE: usize = 2 * 1024 * 1024; // 2 MB in bytes, like Axum's default

#[derive(Deserialize, Debug)]
struct GETQueryParams {
    pub query: Option<String>,
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
    pub variables: Option<String>,
    pub extensions: Option<String>,
}

impl TryInto<ExecutionRequest> for GETQueryParams {
    type Error = PipelineErrorVariant;

    fn try_into(self) -> Result<ExecutionRequest, Self::Error> {
        let query = match self.query {
            Some(q) => q,
            None => return Err(PipelineErrorVariant::GetMissingQueryParam("query")),
        };

        let variables = match self.variables.as_deref() {
            Some(v_str) if !v_str.is_empty() => match serde_json::from_str(v_str) {
                Ok(vars) => Some(vars),
                Err(e) => {
                    return Err(PipelineErrorVariant::FailedToParseVariables(e));
                }
            },
            _ => None,
        };

        let extensions = match self.extensions.as_deref() {
            Some(e_str) if !e_str.is_empty() => match serde_json::from_str(e_str) {
                Ok(exts) => Some(exts),
                Err(e) => {
                    return Err(PipelineErrorVariant::FailedToParseExtensions(e));
                }
            },
            _ => None,
        };

        Ok(ExecutionRequest {
            query,
            operation_name: self.operation_name,
            variables,
            extensions,
        })
    }
}

/// Reads the GraphQL request from the query string of a `GET` or the JSON body of a `POST`.
pub async fn get_execution_request(req: Request<Body>) -> Result<ExecutionRequest, PipelineErrorVariant> {
    match *req.method() {
        Method::GET => {
            trace!("processing GET GraphQL operation");

            let query_params = Query::<GETQueryParams>::try_from_uri(req.uri())
                .map_err(PipelineErrorVariant::GetInvalidQueryParams)?
                .0;

            trace!("parsed GET query params: {:?}", query_params);

            query_params.try_into()
        }
        Method::POST => {
            trace!("Processing POST GraphQL request");

            assert_json_content_type(req.headers())?;

            let body_bytes = to_bytes(req.into_body(), MAX_BODY_SIZE)
                .await
                .map_err(|err| {
                    warn!("Failed to read body bytes: {}", err);
                    PipelineErrorVariant::FailedToReadBodyBytes(err)
                })?;

            serde_json::from_slice::<ExecutionRequest>(&body_bytes).map_err(|e| {
                warn!("Failed to parse body: {}", e);
                PipelineErrorVariant::FailedToParseBody(e)
            })
        }
        ref method => {
            warn!("unsupported HTTP method: {}", method);

            Err(PipelineErrorVariant::UnsupportedHttpMethod(method.clone()))
        }
    }
}
