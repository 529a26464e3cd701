use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::response::graphql_error::GraphQLError;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl ExecutionResult {
    pub fn new(
        data: Option<Value>,
        errors: Option<Vec<GraphQLError>>,
        extensions: Option<Map<String, Value>>,
    ) -> ExecutionResult {
        let final_errors = match errors {
            Some(errors) if errors.is_empty() => None,
            _ => errors,
        };
        let final_extensions = match extensions {
            Some(extensions) if extensions.is_empty() => None,
            _ => extensions,
        };
        ExecutionResult {
            data,
            errors: final_errors,
            extensions: final_extensions,
        }
    }

    pub fn from_error(error: GraphQLError) -> ExecutionResult {
        ExecutionResult {
            data: None,
            errors: Some(vec![error]),
            extensions: None,
        }
    }

    pub fn from_error_message(message: String) -> ExecutionResult {
        Self::from_error(message.into())
    }

    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }

    pub fn push_errors(&mut self, errors: Option<Vec<GraphQLError>>) {
        if let Some(errors) = errors.filter(|errors| !errors.is_empty()) {
            self.errors.get_or_insert_with(Vec::new).extend(errors);
        }
    }
}
