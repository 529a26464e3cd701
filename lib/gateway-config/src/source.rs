use std::{collections::HashMap, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the schema being filtered comes from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "source")]
pub enum SchemaSourceConfig {
    /// The in-process blog schema, resolved from an in-memory store.
    #[serde(rename = "local")]
    Local {
        /// How often the `counter` subscription ticks.
        #[serde(
            default = "default_counter_interval",
            deserialize_with = "humantime_serde::deserialize",
            serialize_with = "humantime_serde::serialize"
        )]
        #[schemars(with = "String")]
        counter_interval: Duration,
    },
    /// A GraphQL service, introspected at startup.
    ///
    /// The endpoint can also be set via the `REMOTE_SCHEMA_ENDPOINT` environment variable.
    #[serde(rename = "remote")]
    Remote {
        endpoint: String,
        /// Static headers sent with every request to the endpoint.
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(
            default = "default_remote_timeout",
            deserialize_with = "humantime_serde::deserialize",
            serialize_with = "humantime_serde::serialize"
        )]
        #[schemars(with = "String")]
        timeout: Duration,
    },
}

impl Default for SchemaSourceConfig {
    fn default() -> Self {
        SchemaSourceConfig::Local {
            counter_interval: default_counter_interval(),
        }
    }
}

impl SchemaSourceConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaSourceConfig::Local { .. } => "local",
            SchemaSourceConfig::Remote { .. } => "remote",
        }
    }
}

fn default_counter_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_remote_timeout() -> Duration {
    Duration::from_secs(30)
}
