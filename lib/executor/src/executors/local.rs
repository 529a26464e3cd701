use async_graphql::{ObjectType, PathSegment, Response, Schema, ServerError, SubscriptionType, Variables};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    executors::{
        common::{ExecutionStream, SchemaExecutor},
        error::ExecutorError,
    },
    request::ExecutionRequest,
    response::{
        execution_result::ExecutionResult,
        graphql_error::{GraphQLError, GraphQLErrorLocation},
    },
};

/// Executes operations in-process against an `async-graphql` schema.
pub struct LocalSchemaExecutor<Schema> {
    pub schema: Schema,
}

impl<Query, Mutation, Subscription> LocalSchemaExecutor<Schema<Query, Mutation, Subscription>>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    pub fn new(schema: Schema<Query, Mutation, Subscription>) -> Self {
        LocalSchemaExecutor { schema }
    }

    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }
}

#[async_trait]
impl<Query, Mutation, Subscription> SchemaExecutor
    for LocalSchemaExecutor<Schema<Query, Mutation, Subscription>>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    #[instrument(level = "trace", skip_all, name = "local_execute")]
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, ExecutorError> {
        let response: Response = self.schema.execute(request).await;
        Ok(response.into())
    }

    #[instrument(level = "trace", skip_all, name = "local_subscribe")]
    async fn subscribe(&self, request: ExecutionRequest) -> Result<ExecutionStream, ExecutorError> {
        let stream = self
            .schema
            .execute_stream(request)
            .map(ExecutionResult::from)
            .boxed();
        Ok(stream)
    }
}

impl From<ExecutionRequest> for async_graphql::Request {
    fn from(exec_request: ExecutionRequest) -> Self {
        let mut req = async_graphql::Request::new(exec_request.query);
        if let Some(variables) = exec_request.variables {
            req = req.variables(Variables::from_json(Value::Object(variables)));
        }
        if let Some(operation_name) = exec_request.operation_name {
            req = req.operation_name(operation_name);
        }
        if let Some(extensions) = exec_request.extensions {
            for (key, value) in extensions {
                req.extensions.insert(
                    key,
                    async_graphql::Value::from_json(value).unwrap_or_default(),
                );
            }
        }
        req
    }
}

impl From<&ServerError> for GraphQLError {
    fn from(error: &ServerError) -> Self {
        let locations = (!error.locations.is_empty()).then(|| {
            error
                .locations
                .iter()
                .map(|loc| GraphQLErrorLocation {
                    line: loc.line,
                    column: loc.column,
                })
                .collect()
        });
        let path = (!error.path.is_empty()).then(|| {
            error
                .path
                .iter()
                .map(|segment| match segment {
                    PathSegment::Field(name) => Value::String(name.to_string()),
                    PathSegment::Index(index) => Value::Number((*index).into()),
                })
                .collect()
        });
        let extensions = error
            .extensions
            .as_ref()
            .and_then(|extensions| serde_json::to_value(extensions).ok())
            .and_then(|value| match value {
                Value::Object(map) if !map.is_empty() => Some(map),
                _ => None,
            });

        GraphQLError {
            message: error.message.clone(),
            locations,
            path,
            extensions,
        }
    }
}

impl From<Response> for ExecutionResult {
    fn from(response: Response) -> Self {
        let data = response
            .data
            .into_json()
            .ok()
            .filter(|data| !data.is_null());
        let errors = response.errors.iter().map(GraphQLError::from).collect();
        let extensions = response
            .extensions
            .into_iter()
            .filter_map(|(key, value)| value.into_json().ok().map(|value| (key, value)))
            .collect::<Map<String, Value>>();

        ExecutionResult::new(data, Some(errors), Some(extensions))
    }
}
