#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaFilterError {
    /// The rule table names fields or types the source schema does not have.
    #[error("Visibility rules reference unknown fields or types: {}", .unknown_selectors.join(", "))]
    Configuration { unknown_selectors: Vec<String> },
    /// A root operation type would be left without a single field.
    #[error("Root type '{type_name}' exposes no fields after filtering")]
    EmptyExposure { type_name: String },
}

impl SchemaFilterError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::EmptyExposure { .. } => "EMPTY_EXPOSURE",
        }
    }
}
