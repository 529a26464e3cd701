use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The `log` section. Each field is overridable through the environment.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level of emitted events. Env: `LOG_LEVEL`.
    #[serde(default)]
    pub level: LogLevel,

    /// Output layout. Env: `LOG_FORMAT`.
    #[serde(default)]
    pub format: LogFormat,

    /// A full `EnvFilter` directive such as `gateway=debug,info`. Takes
    /// precedence over `level`. Env: `LOG_FILTER`.
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// The directive handed to `tracing_subscriber::EnvFilter`.
    pub fn env_filter_str(&self) -> &str {
        self.filter.as_deref().unwrap_or(self.level.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::ALL, Self::as_str, "log level", s)
    }
}

/// Development builds default to compact human output, release builds to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    PrettyTree,
    PrettyCompact,
    Json,
}

impl LogFormat {
    const ALL: [LogFormat; 3] = [LogFormat::PrettyTree, LogFormat::PrettyCompact, LogFormat::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::PrettyTree => "pretty-tree",
            LogFormat::PrettyCompact => "pretty-compact",
            LogFormat::Json => "json",
        }
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            LogFormat::PrettyCompact
        } else {
            LogFormat::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::ALL, Self::as_str, "log format", s)
    }
}

fn parse_named<T: Copy>(
    variants: &[T],
    name: fn(T) -> &'static str,
    kind: &str,
    input: &str,
) -> Result<T, String> {
    variants
        .iter()
        .copied()
        .find(|variant| name(*variant).eq_ignore_ascii_case(input.trim()))
        .ok_or_else(|| {
            let expected: Vec<&str> = variants.iter().map(|variant| name(*variant)).collect();
            format!(
                "invalid {kind} `{input}`, expected one of: {}",
                expected.join(", ")
            )
        })
}
