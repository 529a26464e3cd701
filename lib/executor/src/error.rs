use gateway_schema_filter::{OperationKind, SchemaFilterError};
use graphql_tools::validation::utils::ValidationError;

use crate::response::graphql_error::GraphQLError;

/// Why an incoming operation was rejected before reaching the source schema.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("{0}")]
    Parse(String),
    #[error("Operation failed validation with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
    #[error("Must provide an operation")]
    OperationNotFound,
    #[error("Unknown operation named \"{operation_name}\"")]
    SpecifiedOperationNotFound { operation_name: String },
    #[error("Must provide operation name if query contains multiple operations")]
    MultipleOperationsWithoutName,
    #[error("Schema is not configured to execute {} operation", .0.as_str())]
    UnsupportedOperation(OperationKind),
}

impl OperationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "GRAPHQL_PARSE_FAILED",
            Self::Validation(_) => "GRAPHQL_VALIDATION_FAILED",
            Self::OperationNotFound
            | Self::SpecifiedOperationNotFound { .. }
            | Self::MultipleOperationsWithoutName
            | Self::UnsupportedOperation(_) => "OPERATION_RESOLUTION_FAILURE",
        }
    }

    /// The errors to report to the client, one per validation failure.
    pub fn graphql_errors(&self) -> Vec<GraphQLError> {
        match self {
            Self::Validation(errors) => errors.iter().map(GraphQLError::from).collect(),
            other => vec![GraphQLError::with_code(other.to_string(), other.error_code())],
        }
    }
}

/// Why a filtered schema could not be built.
#[derive(Debug, thiserror::Error)]
pub enum FilteredSchemaError {
    #[error(transparent)]
    Filter(#[from] SchemaFilterError),
    #[error("Failed to build the introspection schema: {0}")]
    IntrospectionSchema(#[from] graphql_tools::parser::schema::ParseError),
}
