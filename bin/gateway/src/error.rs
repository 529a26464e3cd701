use gateway_executor::{ExecutorError, FilteredSchemaError, SourceError};

/// Failures that keep the gateway from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to load the source schema: {0}")]
    Source(#[from] SourceError),
    #[error("Failed to configure the remote executor: {0}")]
    Executor(#[from] ExecutorError),
    #[error("Failed to build the filtered schema: {0}")]
    FilteredSchema(#[from] FilteredSchemaError),
}

impl StartupError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FilteredSchema(FilteredSchemaError::Filter(error)) => error.error_code(),
            Self::Source(_) | Self::Executor(_) => "REMOTE_TRANSPORT_ERROR",
            Self::FilteredSchema(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}
