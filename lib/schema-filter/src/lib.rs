mod closure;
pub mod error;
pub mod filter;
pub mod rules;
pub mod schema;
pub mod transformer;

pub use error::SchemaFilterError;
pub use filter::{Exposure, FilteredDocument, SchemaFilter};
pub use rules::{FilterRule, FilterRules, WILDCARD_SELECTOR};
pub use schema::{OperationKind, RootOperationTypes};

/// A parsed schema document that owns all of its strings.
pub type SchemaDocument = graphql_tools::parser::schema::Document<'static, String>;

pub fn parse_schema(sdl: &str) -> Result<SchemaDocument, graphql_tools::parser::schema::ParseError> {
    Ok(graphql_tools::parser::parse_schema::<String>(sdl)?.into_static())
}
