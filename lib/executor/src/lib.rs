pub mod error;
pub mod executors;
pub mod filtered;
pub mod introspection;
pub mod operation;
pub mod request;
pub mod response;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::{FilteredSchemaError, OperationError};
pub use executors::{
    common::{ExecutionStream, SchemaExecutor, SchemaExecutorBoxedArc},
    error::ExecutorError,
    http::HTTPSchemaExecutor,
    local::LocalSchemaExecutor,
};
pub use filtered::{FilteredSchema, PreparedOperation};
pub use request::ExecutionRequest;
pub use response::{execution_result::ExecutionResult, graphql_error::GraphQLError};
pub use source::{SourceError, SourceKind, SourceSchema};
