use gateway_config::source::SchemaSourceConfig;
use gateway_executor::{HTTPSchemaExecutor, LocalSchemaExecutor, SourceSchema};
use tracing::info;

use crate::error::StartupError;

/// Builds the unfiltered schema the configuration points at.
///
/// A remote source is introspected here, so an unreachable service fails startup.
pub async fn load_source_schema(config: &SchemaSourceConfig) -> Result<SourceSchema, StartupError> {
    match config {
        SchemaSourceConfig::Local { counter_interval } => {
            info!(
                "using the local blog schema, counter ticks every {:?}",
                counter_interval
            );
            let schema = subgraphs::blog::get_schema(*counter_interval);
            Ok(SourceSchema::local(LocalSchemaExecutor::new(schema))?)
        }
        SchemaSourceConfig::Remote {
            endpoint,
            headers,
            timeout,
        } => {
            info!("using the remote schema at {}", endpoint);
            let executor =
                HTTPSchemaExecutor::new(endpoint, reqwest::Client::new(), headers, *timeout)?;
            Ok(SourceSchema::remote(executor).await?)
        }
    }
}
