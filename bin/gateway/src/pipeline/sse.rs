use std::convert::Infallible;

use axum::{
    body::Body,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::{stream, StreamExt};
use gateway_executor::ExecutionStream;
use http::Response;
use tracing::warn;

/// Streams subscription results as GraphQL over server-sent events: one `next`
/// event per result and a final `complete`.
///
/// Dropping the response (client disconnect) drops the source stream with it.
pub fn event_stream_response(results: ExecutionStream) -> Response<Body> {
    let events = results
        .map(|result| {
            let event = Event::default().event("next");
            match event.json_data(&result) {
                Ok(event) => event,
                Err(err) => {
                    warn!("failed to serialize a subscription event: {}", err);
                    Event::default()
                        .event("next")
                        .data(r#"{"errors":[{"message":"Failed to serialize event"}]}"#)
                }
            }
        })
        .chain(stream::once(async {
            Event::default().event("complete").data("")
        }))
        .map(Ok::<_, Infallible>);

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
