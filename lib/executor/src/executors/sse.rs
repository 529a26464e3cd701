use std::fmt::Display;

use futures::{stream::BoxStream, Stream, StreamExt};

use crate::response::execution_result::ExecutionResult;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SseParseError {
    #[error("Invalid UTF-8 sequence: {0}")]
    InvalidUtf8(String),
    #[error("Stream read error: {0}")]
    StreamReadError(String),
    #[error("Invalid execution result in event: {0}")]
    InvalidPayload(String),
}

/// Turns a chunked `text/event-stream` body into execution results.
///
/// `next` events carry one result each, `complete` ends the stream and
/// events of any other type (pings) are skipped.
pub fn parse_to_stream<S, B, E>(
    body_stream: S,
) -> BoxStream<'static, Result<ExecutionResult, SseParseError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut body = Box::pin(body_stream);
        let mut buffer = Vec::<u8>::new();
        loop {
            while let Some(boundary) = find_sse_event_boundary(&buffer) {
                let event_bytes: Vec<u8> = buffer.drain(..boundary).collect();

                let event = match parse(&event_bytes) {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let Some(event) = event else {
                    continue;
                };

                match event.event.as_deref() {
                    Some("next") if !event.data.is_empty() => {
                        match serde_json::from_str::<ExecutionResult>(&event.data) {
                            Ok(result) => yield Ok(result),
                            Err(e) => {
                                yield Err(SseParseError::InvalidPayload(e.to_string()));
                                return;
                            }
                        }
                    }
                    Some("complete") => return,
                    _ => {}
                }
            }

            match body.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    yield Err(SseParseError::StreamReadError(e.to_string()));
                    return;
                }
                None => return,
            }
        }
    };

    stream.boxed()
}

#[derive(Debug, PartialEq)]
struct SseEvent {
    event: Option<String>,
    data: String,
}

/// Position right after the blank line terminating the first complete event.
fn find_sse_event_boundary(buffer: &[u8]) -> Option<usize> {
    (0..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\n\n") {
            Some(i + 2)
        } else if rest.starts_with(b"\r\n\r\n") {
            Some(i + 4)
        } else {
            None
        }
    })
}

fn parse(raw: &[u8]) -> Result<Option<SseEvent>, SseParseError> {
    let text = std::str::from_utf8(raw).map_err(|e| SseParseError::InvalidUtf8(e.to_string()))?;

    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        // comments are used as keep-alive pings
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "event" => event = Some(value.to_string()),
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    if event.is_none() && data_lines.is_empty() {
        return Ok(None);
    }

    Ok(Some(SseEvent {
        event,
        data: data_lines.join("\n"),
    }))
}
