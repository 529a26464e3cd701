use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{
    executors::error::ExecutorError, request::ExecutionRequest,
    response::execution_result::ExecutionResult,
};

pub type ExecutionStream = BoxStream<'static, ExecutionResult>;

/// Runs operations against a complete, unfiltered schema.
#[async_trait]
pub trait SchemaExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, ExecutorError>;

    async fn subscribe(&self, request: ExecutionRequest) -> Result<ExecutionStream, ExecutorError>;

    fn to_boxed_arc<'a>(self) -> Arc<Box<dyn SchemaExecutor + Send + Sync + 'a>>
    where
        Self: Sized + Send + Sync + 'a,
    {
        Arc::new(Box::new(self))
    }
}

pub type SchemaExecutorType = dyn SchemaExecutor + Send + Sync;

pub type SchemaExecutorBoxedArc = Arc<Box<SchemaExecutorType>>;
