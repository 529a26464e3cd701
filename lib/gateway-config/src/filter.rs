use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FilterRuleConfig {
    /// A root field name, a type name, or `*` for everything not listed.
    pub field: String,
    pub expose: bool,
}

/// The visibility rule table, in declaration order.
///
/// Defaults to exposing everything.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FilterConfig(pub Vec<FilterRuleConfig>);

impl Default for FilterConfig {
    fn default() -> Self {
        Self(vec![FilterRuleConfig {
            field: "*".to_string(),
            expose: true,
        }])
    }
}

impl FilterConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|rule| (rule.field.as_str(), rule.expose))
    }
}
