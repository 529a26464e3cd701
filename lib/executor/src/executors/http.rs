use std::{collections::HashMap, str::FromStr, time::Duration};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderMap, HeaderName, HeaderValue,
};
use reqwest::Client;
use tracing::{debug, error, instrument, trace};
use url::Url;

use crate::{
    executors::{
        common::{ExecutionStream, SchemaExecutor},
        error::ExecutorError,
        sse::parse_to_stream,
    },
    request::ExecutionRequest,
    response::execution_result::ExecutionResult,
};

const APPLICATION_JSON: &str = "application/json";
const TEXT_EVENT_STREAM: &str = "text/event-stream";

/// Forwards operations to a remote GraphQL service over HTTP.
///
/// Queries and mutations are sent as a JSON `POST`, subscriptions use GraphQL
/// over server-sent events.
#[derive(Debug, Clone)]
pub struct HTTPSchemaExecutor {
    pub endpoint: Url,
    pub http_client: Client,
    pub header_map: HeaderMap,
    pub timeout: Duration,
}

impl HTTPSchemaExecutor {
    pub fn new(
        endpoint: &str,
        http_client: Client,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, ExecutorError> {
        let endpoint = endpoint
            .parse::<Url>()
            .map_err(|e| ExecutorError::EndpointParseFailure(endpoint.to_string(), e.to_string()))?;

        let mut header_map = HeaderMap::new();
        header_map.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        for (name, value) in headers {
            let header_name = HeaderName::from_str(name)
                .map_err(|e| ExecutorError::InvalidHeader(name.clone(), e.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ExecutorError::InvalidHeader(name.clone(), e.to_string()))?;
            header_map.insert(header_name, header_value);
        }

        Ok(HTTPSchemaExecutor {
            endpoint,
            http_client,
            header_map,
            timeout,
        })
    }

    fn endpoint_str(&self) -> String {
        self.endpoint.to_string()
    }

    fn request_error(&self, error: reqwest::Error) -> ExecutorError {
        if error.is_timeout() {
            ExecutorError::RequestTimeout(self.endpoint_str(), self.timeout)
        } else {
            ExecutorError::RequestFailure(self.endpoint_str(), error.to_string())
        }
    }

    async fn send(
        &self,
        request: &ExecutionRequest,
        accept: &'static str,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, ExecutorError> {
        let mut builder = self
            .http_client
            .post(self.endpoint.clone())
            .headers(self.header_map.clone())
            .header(ACCEPT, HeaderValue::from_static(accept))
            .json(request);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        builder.send().await.map_err(|e| self.request_error(e))
    }

    async fn read_result(
        &self,
        response: reqwest::Response,
    ) -> Result<ExecutionResult, ExecutorError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;

        // GraphQL servers report request errors with a 4xx status and a regular body
        serde_json::from_slice::<ExecutionResult>(&bytes).map_err(|e| {
            if status.is_success() {
                ExecutorError::ResponseDecodeFailure(self.endpoint_str(), e.to_string())
            } else {
                ExecutorError::UnexpectedStatus(self.endpoint_str(), status.as_u16())
            }
        })
    }
}

#[async_trait]
impl SchemaExecutor for HTTPSchemaExecutor {
    #[instrument(level = "trace", skip_all, name = "http_execute", fields(endpoint = %self.endpoint))]
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, ExecutorError> {
        trace!("executing HTTP request to {}", self.endpoint);

        let response = self
            .send(&request, APPLICATION_JSON, Some(self.timeout))
            .await?;

        self.read_result(response).await.inspect_err(|e| {
            error!("{}", e);
        })
    }

    #[instrument(level = "trace", skip_all, name = "http_subscribe", fields(endpoint = %self.endpoint))]
    async fn subscribe(&self, request: ExecutionRequest) -> Result<ExecutionStream, ExecutorError> {
        let response = self.send(&request, TEXT_EVENT_STREAM, None).await?;

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(TEXT_EVENT_STREAM));

        if !is_event_stream {
            // a single result, usually a request error, instead of a stream
            debug!("subscription was answered without an event stream");
            let result = self.read_result(response).await?;
            return Ok(stream::once(async move { result }).boxed());
        }

        let endpoint = self.endpoint_str();
        let results = parse_to_stream(response.bytes_stream()).map(move |item| match item {
            Ok(result) => result,
            Err(e) => {
                error!("subscription stream from {} failed: {}", endpoint, e);
                ExecutionResult::from_error(
                    ExecutorError::StreamFailure(endpoint.clone(), e.to_string()).into(),
                )
            }
        });

        Ok(results.boxed())
    }
}
