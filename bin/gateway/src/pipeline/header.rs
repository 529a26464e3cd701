use http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderMap, HeaderValue,
};
use tracing::{trace, warn};

use crate::pipeline::error::PipelineErrorVariant;

pub const APPLICATION_JSON_STR: &str = "application/json";
pub static APPLICATION_JSON: HeaderValue = HeaderValue::from_static(APPLICATION_JSON_STR);
pub const APPLICATION_GRAPHQL_RESPONSE_JSON_STR: &str = "application/graphql-response+json";
pub static APPLICATION_GRAPHQL_RESPONSE_JSON: HeaderValue =
    HeaderValue::from_static(APPLICATION_GRAPHQL_RESPONSE_JSON_STR);
pub const TEXT_EVENT_STREAM_STR: &str = "text/event-stream";

pub trait RequestAccepts {
    fn accepts_content_type(&self, content_type: &str) -> bool;
}

impl RequestAccepts for HeaderMap {
    fn accepts_content_type(&self, content_type: &str) -> bool {
        self.get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains(content_type))
    }
}

/// Picks the JSON flavour the client asked for.
pub fn response_content_type(headers: &HeaderMap) -> HeaderValue {
    if headers.accepts_content_type(APPLICATION_GRAPHQL_RESPONSE_JSON_STR) {
        APPLICATION_GRAPHQL_RESPONSE_JSON.clone()
    } else {
        APPLICATION_JSON.clone()
    }
}

pub fn assert_json_content_type(headers: &HeaderMap) -> Result<(), PipelineErrorVariant> {
    let Some(content_type) = headers.get(CONTENT_TYPE) else {
        trace!("POST without content type detected");
        return Err(PipelineErrorVariant::MissingContentTypeHeader);
    };

    let content_type = content_type
        .to_str()
        .map_err(|_| PipelineErrorVariant::InvalidHeaderValue(CONTENT_TYPE))?;

    if !content_type.contains(APPLICATION_JSON_STR) {
        warn!("Invalid content type on a POST request: {}", content_type);
        return Err(PipelineErrorVariant::UnsupportedContentType);
    }

    Ok(())
}
