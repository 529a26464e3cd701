use graphql_tools::validation::utils::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<GraphQLErrorLocation>>,
    /// Path segments are either field names or list indexes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphQLErrorLocation {
    pub line: usize,
    pub column: usize,
}

impl GraphQLError {
    pub fn with_code(message: impl Into<String>, code: &str) -> Self {
        let mut extensions = Map::new();
        extensions.insert("code".to_string(), Value::String(code.to_string()));

        GraphQLError {
            message: message.into(),
            locations: None,
            path: None,
            extensions: Some(extensions),
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.get("code"))
            .and_then(Value::as_str)
    }
}

impl From<String> for GraphQLError {
    fn from(message: String) -> Self {
        GraphQLError {
            message,
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

impl From<&ValidationError> for GraphQLError {
    fn from(error: &ValidationError) -> Self {
        let mut graphql_error = GraphQLError::with_code(&error.message, "GRAPHQL_VALIDATION_FAILED");
        graphql_error.locations = Some(
            error
                .locations
                .iter()
                .map(|pos| GraphQLErrorLocation {
                    line: pos.line,
                    column: pos.column,
                })
                .collect(),
        );
        graphql_error
    }
}
