mod env_overrides;
pub mod filter;
pub mod http_server;
pub mod log;
pub mod source;

use std::convert::Infallible;
use std::path::PathBuf;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    filter::FilterConfig,
    http_server::HttpServerConfig,
    log::LoggingConfig,
    source::SchemaSourceConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// The gateway logger configuration.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Configuration for the HTTP server/listener.
    #[serde(default)]
    pub http: HttpServerConfig,

    /// The schema to filter. Defaults to the local blog schema.
    #[serde(default)]
    #[schemars(extend("type" = "object"))]
    pub source: SchemaSourceConfig,

    /// Ordered visibility rules applied to the source schema.
    ///
    /// An exact `field` wins over `*`; a later duplicate wins over an earlier one.
    #[serde(default)]
    pub filter: FilterConfig,
}

impl GatewayConfig {
    pub fn address(&self) -> String {
        self.http.address()
    }

    pub fn graphql_path(&self) -> &str {
        &self.http.graphql_endpoint
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "gateway.config.yaml",
    "gateway.config.yml",
    "gateway.config.json",
    "gateway.config.json5",
];

/// Loads the configuration from `override_config_path` (required when given) or from
/// the optional default file names, then applies environment overrides.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<GatewayConfig, GatewayConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(GatewayConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    Ok(config.build()?.try_deserialize::<GatewayConfig>()?)
}

pub fn parse_yaml_config(config_raw: String) -> Result<GatewayConfig, GatewayConfigError> {
    Config::builder()
        .add_source(File::from_str(&config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<GatewayConfig>()
        .map_err(GatewayConfigError::ConfigLoadError)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        filter::FilterRuleConfig,
        log::{LogFormat, LogLevel},
        parse_yaml_config,
        source::SchemaSourceConfig,
    };

    #[test]
    fn empty_config_exposes_the_local_schema() {
        let config = parse_yaml_config(String::from("{}")).unwrap();

        assert_eq!(config.address(), "0.0.0.0:4000");
        assert_eq!(config.graphql_path(), "/graphql");
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(
            config.source,
            SchemaSourceConfig::Local {
                counter_interval: Duration::from_secs(2)
            }
        );
        assert_eq!(config.filter.iter().collect::<Vec<_>>(), vec![("*", true)]);
    }

    #[test]
    fn local_source_with_rules() {
        let yaml_str = r#"
            log:
              level: debug
              format: pretty-tree
            http:
              port: 4100
            source:
              source: local
              counter_interval: 500ms
            filter:
              - field: "*"
                expose: false
              - field: author
                expose: true
              - field: upvotePost
                expose: true
        "#;
        let config = parse_yaml_config(String::from(yaml_str)).unwrap();

        assert_eq!(config.address(), "0.0.0.0:4100");
        assert_eq!(config.log.format, LogFormat::PrettyTree);
        assert_eq!(config.log.env_filter_str(), "debug");
        assert_eq!(
            config.source,
            SchemaSourceConfig::Local {
                counter_interval: Duration::from_millis(500)
            }
        );
        assert_eq!(
            config.filter.iter().collect::<Vec<_>>(),
            vec![("*", false), ("author", true), ("upvotePost", true)]
        );
    }

    #[test]
    fn remote_source_defaults() {
        let yaml_str = r#"
            source:
              source: remote
              endpoint: https://swapi.example.com/graphql
            filter:
              - field: "*"
                expose: false
              - field: Asset
                expose: true
        "#;
        let config = parse_yaml_config(String::from(yaml_str)).unwrap();

        let SchemaSourceConfig::Remote {
            endpoint,
            headers,
            timeout,
        } = &config.source
        else {
            panic!("expected a remote source");
        };
        assert_eq!(endpoint, "https://swapi.example.com/graphql");
        assert!(headers.is_empty());
        assert_eq!(*timeout, Duration::from_secs(30));
        assert_eq!(config.source.kind(), "remote");
        assert_eq!(
            config.filter.0[1],
            FilterRuleConfig {
                field: "Asset".to_string(),
                expose: true
            }
        );
    }

    #[test]
    fn remote_source_requires_an_endpoint() {
        let yaml_str = r#"
            source:
              source: remote
              timeout: 5s
        "#;

        assert!(parse_yaml_config(String::from(yaml_str)).is_err());
    }

    #[test]
    fn rejects_unknown_sections() {
        let yaml_str = r#"
            supergraph:
              source: file
        "#;

        assert!(parse_yaml_config(String::from(yaml_str)).is_err());
    }
}
