use std::str::FromStr;

use gateway_schema_filter::SchemaDocument;
use graphql_tools::parser::{
    query::{Definition as QueryDefinition, OperationDefinition, Selection},
    schema::{
        Definition, Directive, DirectiveDefinition, DirectiveLocation, EnumType, EnumValue, Field,
        InputObjectType, InputValue, InterfaceType, ObjectType, ScalarType, SchemaDefinition, Type,
        TypeDefinition, UnionType, Value,
    },
    Pos,
};
use serde::Deserialize;
use tracing::warn;

const SPECIFIED_DIRECTIVES: [&str; 5] = ["include", "skip", "deprecated", "specifiedBy", "oneOf"];
const SPECIFIED_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

#[derive(Debug, thiserror::Error)]
pub enum RemoteSchemaError {
    #[error("Introspection result is malformed: {0}")]
    InvalidIntrospection(String),
}

/// The `data` of an introspection query response.
#[derive(Debug, Deserialize)]
pub struct IntrospectionData {
    #[serde(rename = "__schema")]
    pub schema: IntrospectedSchema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedSchema {
    pub query_type: Option<NamedRef>,
    pub mutation_type: Option<NamedRef>,
    pub subscription_type: Option<NamedRef>,
    pub types: Vec<IntrospectedType>,
    #[serde(default)]
    pub directives: Vec<IntrospectedDirective>,
}

#[derive(Debug, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedType {
    pub kind: TypeKind,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "specifiedByURL", alias = "specifiedByUrl")]
    pub specified_by_url: Option<String>,
    pub fields: Option<Vec<IntrospectedField>>,
    pub input_fields: Option<Vec<IntrospectedInputValue>>,
    pub interfaces: Option<Vec<TypeRef>>,
    pub enum_values: Option<Vec<IntrospectedEnumValue>>,
    pub possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedField {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<IntrospectedInputValue>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedInputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedEnumValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedDirective {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<IntrospectedInputValue>,
    #[serde(default)]
    pub is_repeatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    pub name: Option<String>,
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    fn to_type(&self) -> Result<Type<'static, String>, RemoteSchemaError> {
        let inner = || {
            self.of_type
                .as_deref()
                .ok_or_else(|| {
                    RemoteSchemaError::InvalidIntrospection(
                        "wrapping type reference without ofType".to_string(),
                    )
                })
                .and_then(TypeRef::to_type)
        };

        match self.kind {
            TypeKind::List => Ok(Type::ListType(Box::new(inner()?))),
            TypeKind::NonNull => Ok(Type::NonNullType(Box::new(inner()?))),
            _ => self.name.clone().map(Type::NamedType).ok_or_else(|| {
                RemoteSchemaError::InvalidIntrospection("named type reference without a name".to_string())
            }),
        }
    }
}

fn deprecated_directive(is_deprecated: bool, reason: &Option<String>) -> Vec<Directive<'static, String>> {
    if !is_deprecated {
        return vec![];
    }

    let arguments = reason
        .as_ref()
        .map(|reason| vec![("reason".to_string(), Value::String(reason.clone()))])
        .unwrap_or_default();

    vec![Directive {
        position: Pos::default(),
        name: "deprecated".to_string(),
        arguments,
    }]
}

/// Parses an introspected `defaultValue` literal by lifting it out of a
/// throwaway operation.
fn parse_default_value(literal: &str) -> Option<Value<'static, String>> {
    let wrapped = format!("{{ f(a: {literal}) }}");
    let document = graphql_tools::parser::parse_query::<String>(&wrapped).ok()?.into_static();
    let QueryDefinition::Operation(OperationDefinition::SelectionSet(selection_set)) =
        document.definitions.into_iter().next()?
    else {
        return None;
    };
    match selection_set.items.into_iter().next()? {
        Selection::Field(field) => field.arguments.into_iter().next().map(|(_, value)| value),
        _ => None,
    }
}

fn input_value(value: &IntrospectedInputValue) -> Result<InputValue<'static, String>, RemoteSchemaError> {
    let default_value = value.default_value.as_deref().and_then(|literal| {
        let parsed = parse_default_value(literal);
        if parsed.is_none() {
            warn!(
                "dropping unparsable default value '{}' of '{}'",
                literal, value.name
            );
        }
        parsed
    });

    Ok(InputValue {
        position: Pos::default(),
        description: value.description.clone(),
        name: value.name.clone(),
        value_type: value.type_ref.to_type()?,
        default_value,
        directives: deprecated_directive(value.is_deprecated, &value.deprecation_reason),
    })
}

fn input_values(values: &[IntrospectedInputValue]) -> Result<Vec<InputValue<'static, String>>, RemoteSchemaError> {
    values.iter().map(input_value).collect()
}

fn fields(fields: &Option<Vec<IntrospectedField>>) -> Result<Vec<Field<'static, String>>, RemoteSchemaError> {
    fields
        .iter()
        .flatten()
        .map(|field| {
            Ok(Field {
                position: Pos::default(),
                description: field.description.clone(),
                name: field.name.clone(),
                arguments: input_values(&field.args)?,
                field_type: field.type_ref.to_type()?,
                directives: deprecated_directive(field.is_deprecated, &field.deprecation_reason),
            })
        })
        .collect()
}

fn type_names(refs: &Option<Vec<TypeRef>>) -> Vec<String> {
    refs.iter()
        .flatten()
        .filter_map(|type_ref| type_ref.name.clone())
        .collect()
}

fn type_definition(ty: &IntrospectedType) -> Result<TypeDefinition<'static, String>, RemoteSchemaError> {
    let position = Pos::default();
    let description = ty.description.clone();
    let name = ty.name.clone();

    Ok(match ty.kind {
        TypeKind::Scalar => {
            let directives = ty
                .specified_by_url
                .as_ref()
                .map(|url| {
                    vec![Directive {
                        position,
                        name: "specifiedBy".to_string(),
                        arguments: vec![("url".to_string(), Value::String(url.clone()))],
                    }]
                })
                .unwrap_or_default();
            TypeDefinition::Scalar(ScalarType {
                position,
                description,
                name,
                directives,
            })
        }
        TypeKind::Object => TypeDefinition::Object(ObjectType {
            position,
            description,
            name,
            implements_interfaces: type_names(&ty.interfaces),
            directives: vec![],
            fields: fields(&ty.fields)?,
        }),
        TypeKind::Interface => TypeDefinition::Interface(InterfaceType {
            position,
            description,
            name,
            implements_interfaces: type_names(&ty.interfaces),
            directives: vec![],
            fields: fields(&ty.fields)?,
        }),
        TypeKind::Union => TypeDefinition::Union(UnionType {
            position,
            description,
            name,
            directives: vec![],
            types: type_names(&ty.possible_types),
        }),
        TypeKind::Enum => TypeDefinition::Enum(EnumType {
            position,
            description,
            name,
            directives: vec![],
            values: ty
                .enum_values
                .iter()
                .flatten()
                .map(|value| EnumValue {
                    position,
                    description: value.description.clone(),
                    name: value.name.clone(),
                    directives: deprecated_directive(value.is_deprecated, &value.deprecation_reason),
                })
                .collect(),
        }),
        TypeKind::InputObject => TypeDefinition::InputObject(InputObjectType {
            position,
            description,
            name,
            directives: vec![],
            fields: input_values(ty.input_fields.as_deref().unwrap_or_default())?,
        }),
        TypeKind::List | TypeKind::NonNull => {
            return Err(RemoteSchemaError::InvalidIntrospection(format!(
                "type '{}' has a wrapping kind",
                ty.name
            )))
        }
    })
}

fn directive_definition(
    directive: &IntrospectedDirective,
) -> Result<DirectiveDefinition<'static, String>, RemoteSchemaError> {
    let locations = directive
        .locations
        .iter()
        .map(|location| {
            DirectiveLocation::from_str(location).map_err(|_| {
                RemoteSchemaError::InvalidIntrospection(format!(
                    "directive '@{}' has unknown location '{}'",
                    directive.name, location
                ))
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(DirectiveDefinition {
        position: Pos::default(),
        description: directive.description.clone(),
        name: directive.name.clone(),
        arguments: input_values(&directive.args)?,
        repeatable: directive.is_repeatable,
        locations,
    })
}

impl IntrospectedSchema {
    /// Rebuilds the schema document the introspection result describes.
    ///
    /// Specified scalars, specified directives and `__` types are left out,
    /// the document carries an explicit `schema { ... }` definition.
    pub fn into_document(self) -> Result<SchemaDocument, RemoteSchemaError> {
        let query = self.query_type.map(|named| named.name).ok_or_else(|| {
            RemoteSchemaError::InvalidIntrospection("schema has no query type".to_string())
        })?;

        let mut definitions = vec![Definition::SchemaDefinition(SchemaDefinition {
            position: Pos::default(),
            directives: vec![],
            query: Some(query),
            mutation: self.mutation_type.map(|named| named.name),
            subscription: self.subscription_type.map(|named| named.name),
        })];

        for ty in &self.types {
            if ty.name.starts_with("__") || SPECIFIED_SCALARS.contains(&ty.name.as_str()) {
                continue;
            }
            definitions.push(Definition::TypeDefinition(type_definition(ty)?));
        }

        for directive in &self.directives {
            if SPECIFIED_DIRECTIVES.contains(&directive.name.as_str()) {
                continue;
            }
            definitions.push(Definition::DirectiveDefinition(directive_definition(directive)?));
        }

        Ok(SchemaDocument { definitions })
    }
}
