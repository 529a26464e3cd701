use std::time::Duration;

use crate::response::graphql_error::GraphQLError;

pub const REMOTE_TRANSPORT_ERROR_CODE: &str = "REMOTE_TRANSPORT_ERROR";

#[derive(thiserror::Error, Debug, Clone)]
pub enum ExecutorError {
    #[error("Failed to parse endpoint \"{0}\" as URL: {1}")]
    EndpointParseFailure(String, String),
    #[error("Header \"{0}\" is not a valid HTTP header: {1}")]
    InvalidHeader(String, String),
    #[error("Failed to send request to \"{0}\": {1}")]
    RequestFailure(String, String),
    #[error("Request to \"{0}\" timed out after {1:?}")]
    RequestTimeout(String, Duration),
    #[error("Remote service \"{0}\" responded with status {1}")]
    UnexpectedStatus(String, u16),
    #[error("Failed to decode the response of \"{0}\": {1}")]
    ResponseDecodeFailure(String, String),
    #[error("Failed to read the event stream of \"{0}\": {1}")]
    StreamFailure(String, String),
}

impl From<ExecutorError> for GraphQLError {
    fn from(error: ExecutorError) -> Self {
        GraphQLError::with_code(error.to_string(), REMOTE_TRANSPORT_ERROR_CODE)
    }
}
