use async_graphql::{ObjectType, Schema, SubscriptionType};
use gateway_schema_filter::{parse_schema, SchemaDocument};
use tracing::{debug, info};

use crate::{
    executors::{
        common::{SchemaExecutor, SchemaExecutorBoxedArc},
        error::ExecutorError,
        http::HTTPSchemaExecutor,
        local::LocalSchemaExecutor,
    },
    introspection::{
        query::INTROSPECTION_QUERY,
        remote::{IntrospectionData, RemoteSchemaError},
    },
    request::ExecutionRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to parse the source schema: {0}")]
    InvalidSchema(#[from] graphql_tools::parser::schema::ParseError),
    #[error("Failed to introspect the remote schema: {0}")]
    Executor(#[from] ExecutorError),
    #[error("Remote schema answered introspection with errors: {}", .0.join("; "))]
    IntrospectionErrors(Vec<String>),
    #[error(transparent)]
    RemoteSchema(#[from] RemoteSchemaError),
}

/// Where the unfiltered schema lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    Remote { endpoint: String },
}

/// The unfiltered schema: its document and the executor able to run
/// operations against it.
pub struct SourceSchema {
    pub kind: SourceKind,
    pub document: SchemaDocument,
    pub executor: SchemaExecutorBoxedArc,
}

impl SourceSchema {
    pub fn new(kind: SourceKind, document: SchemaDocument, executor: SchemaExecutorBoxedArc) -> Self {
        SourceSchema {
            kind,
            document,
            executor,
        }
    }

    /// Wraps an in-process schema, reading its document from the printed SDL.
    pub fn local<Query, Mutation, Subscription>(
        executor: LocalSchemaExecutor<Schema<Query, Mutation, Subscription>>,
    ) -> Result<Self, SourceError>
    where
        Query: ObjectType + 'static,
        Mutation: ObjectType + 'static,
        Subscription: SubscriptionType + 'static,
    {
        let document = parse_schema(&executor.sdl())?;
        debug!(
            "local source schema has {} definitions",
            document.definitions.len()
        );

        Ok(Self::new(SourceKind::Local, document, executor.to_boxed_arc()))
    }

    /// Introspects a remote service and keeps the executor for later delegation.
    pub async fn remote(executor: HTTPSchemaExecutor) -> Result<Self, SourceError> {
        let endpoint = executor.endpoint.to_string();
        info!("introspecting remote schema at {}", endpoint);

        let request =
            ExecutionRequest::new(INTROSPECTION_QUERY).with_operation_name("IntrospectionQuery");
        let result = executor.execute(request).await?;

        let Some(data) = result.data else {
            let messages = result
                .errors
                .unwrap_or_default()
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>();
            return Err(SourceError::IntrospectionErrors(messages));
        };

        let introspection: IntrospectionData = serde_json::from_value(data)
            .map_err(|e| RemoteSchemaError::InvalidIntrospection(e.to_string()))?;
        let document = introspection.schema.into_document()?;
        debug!(
            "remote source schema has {} definitions",
            document.definitions.len()
        );

        Ok(Self::new(
            SourceKind::Remote { endpoint },
            document,
            executor.to_boxed_arc(),
        ))
    }

    pub fn sdl(&self) -> String {
        self.document.to_string()
    }
}
