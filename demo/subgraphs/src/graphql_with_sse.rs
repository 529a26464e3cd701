use std::{
    convert::Infallible,
    task::{Context, Poll},
};

use async_graphql::Executor;
use async_graphql_axum::{rejection::GraphQLRejection, GraphQL as AsyncGraphQL, GraphQLRequest};
use axum::{
    body::{Body, Bytes, HttpBody},
    extract::FromRequest,
    http::{header::ACCEPT, Request as HttpRequest, Response as HttpResponse},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    BoxError,
};
use futures::{future::BoxFuture, stream, StreamExt};
use tower::Service;

/// The `async-graphql-axum` service, extended with GraphQL over server-sent
/// events for requests accepting `text/event-stream`.
#[derive(Clone)]
pub struct GraphQL<E> {
    inner: AsyncGraphQL<E>,
    executor: E,
}

impl<E> GraphQL<E>
where
    E: Executor + Clone,
{
    pub fn new(executor: E) -> Self {
        Self {
            inner: AsyncGraphQL::new(executor.clone()),
            executor,
        }
    }
}

impl<B, E> Service<HttpRequest<B>> for GraphQL<E>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
    E: Executor,
{
    type Response = HttpResponse<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Service::<HttpRequest<B>>::poll_ready(&mut self.inner, cx)
    }

    fn call(&mut self, req: HttpRequest<B>) -> Self::Future {
        let accepts_event_stream = req
            .headers()
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("text/event-stream"));

        if !accepts_event_stream {
            return Service::<HttpRequest<B>>::call(&mut self.inner, req);
        }

        let executor = self.executor.clone();
        let req = req.map(Body::new);
        Box::pin(async move {
            let req = match GraphQLRequest::<GraphQLRejection>::from_request(req, &()).await {
                Ok(req) => req,
                Err(err) => return Ok(err.into_response()),
            };

            let events = executor
                .execute_stream(req.0, None)
                .map(|response| Event::default().event("next").json_data(response))
                .chain(stream::once(async {
                    Ok(Event::default().event("complete").data(""))
                }));

            Ok(Sse::new(events)
                .keep_alive(KeepAlive::default())
                .into_response())
        })
    }
}
