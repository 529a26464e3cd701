use std::collections::{HashMap, HashSet};

use gateway_schema_filter::{
    parse_schema,
    schema::{named_type, type_definition_name},
    RootOperationTypes, SchemaDocument,
};
use graphql_tools::parser::{
    schema::{
        Definition, DirectiveDefinition, Field, InputValue, ParseError, Type, TypeDefinition,
    },
    Pos,
};

const INTROSPECTION_SDL: &str = include_str!("./introspection_schema.graphql");

const SPECIFIED_SCALARS_SDL: &str = r#"
scalar Int
scalar Float
scalar String
scalar Boolean
scalar ID
"#;

const SPECIFIED_DIRECTIVES_SDL: &str = r#"
directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
directive @specifiedBy(url: String!) on SCALAR
"#;

/// Scalars the introspection types themselves depend on.
const ALWAYS_PRESENT_SCALARS: [&str; 2] = ["String", "Boolean"];

/// The schema as clients see it: the filtered document completed with the
/// specified scalars and directives, the `__` types and the `__schema`/`__type`
/// entry points on the query type.
///
/// Operations are validated against this document and introspection is
/// answered from it.
#[derive(Debug)]
pub struct IntrospectionSchema {
    document: SchemaDocument,
    roots: RootOperationTypes,
    types: HashMap<String, usize>,
    implementations: HashMap<String, Vec<String>>,
}

impl IntrospectionSchema {
    pub fn new(filtered: &SchemaDocument) -> Result<Self, ParseError> {
        let roots = RootOperationTypes::from_document(filtered);
        let mut document = filtered.clone();

        let declared: HashSet<String> = document
            .definitions
            .iter()
            .filter_map(declared_key)
            .collect();
        let referenced = referenced_type_names(&document);

        for definition in parse_schema(SPECIFIED_SCALARS_SDL)?.definitions {
            let Some(name) = definition_name(&definition) else {
                continue;
            };
            let needed = referenced.contains(name) || ALWAYS_PRESENT_SCALARS.contains(&name);
            if needed && !declared.contains(name) {
                document.definitions.push(definition);
            }
        }

        for definition in parse_schema(SPECIFIED_DIRECTIVES_SDL)?.definitions {
            if let Definition::DirectiveDefinition(directive) = &definition {
                if !declared.contains(&directive_key(&directive.name)) {
                    document.definitions.push(definition);
                }
            }
        }

        document
            .definitions
            .extend(parse_schema(INTROSPECTION_SDL)?.definitions);

        if let Some(query_type) = roots.query.as_deref() {
            add_introspection_entry_points(&mut document, query_type);
        }

        let mut types = HashMap::new();
        let mut implementations: HashMap<String, Vec<String>> = HashMap::new();
        for (position, definition) in document.definitions.iter().enumerate() {
            let Definition::TypeDefinition(type_def) = definition else {
                continue;
            };
            if let TypeDefinition::Object(object) = type_def {
                for interface in &object.implements_interfaces {
                    implementations
                        .entry(interface.clone())
                        .or_default()
                        .push(object.name.clone());
                }
            }
            types.insert(type_definition_name(type_def).to_string(), position);
        }

        Ok(Self {
            document,
            roots,
            types,
            implementations,
        })
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn roots(&self) -> &RootOperationTypes {
        &self.roots
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeDefinition<'static, String>> {
        let position = *self.types.get(name)?;
        match &self.document.definitions[position] {
            Definition::TypeDefinition(type_def) => Some(type_def),
            _ => None,
        }
    }

    /// Every named type, in document order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition<'static, String>> {
        self.document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::TypeDefinition(type_def) => Some(type_def),
                _ => None,
            })
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition<'static, String>> {
        self.document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::DirectiveDefinition(directive) => Some(directive),
                _ => None,
            })
    }

    /// Members of a union, or the object types implementing an interface.
    pub fn possible_types(&self, abstract_type: &TypeDefinition<'static, String>) -> Vec<&TypeDefinition<'static, String>> {
        let names: Vec<&str> = match abstract_type {
            TypeDefinition::Union(union) => union.types.iter().map(String::as_str).collect(),
            TypeDefinition::Interface(interface) => self
                .implementations
                .get(&interface.name)
                .map(|names| names.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            _ => return Vec::new(),
        };

        names
            .into_iter()
            .filter_map(|name| self.type_by_name(name))
            .collect()
    }
}

// Directives and types share the lookup set, so directives get an `@` prefix.
fn directive_key(name: &str) -> String {
    format!("@{name}")
}

fn definition_name<'a>(definition: &'a Definition<'static, String>) -> Option<&'a str> {
    match definition {
        Definition::TypeDefinition(type_def) => Some(type_definition_name(type_def)),
        _ => None,
    }
}

fn declared_key(definition: &Definition<'static, String>) -> Option<String> {
    match definition {
        Definition::DirectiveDefinition(directive) => Some(directive_key(&directive.name)),
        other => definition_name(other).map(str::to_string),
    }
}

fn referenced_type_names(document: &SchemaDocument) -> HashSet<String> {
    fn visit_input_values(values: &[InputValue<'static, String>], referenced: &mut HashSet<String>) {
        for value in values {
            referenced.insert(named_type(&value.value_type).to_string());
        }
    }

    let mut referenced = HashSet::new();

    for definition in &document.definitions {
        match definition {
            Definition::TypeDefinition(TypeDefinition::Object(object)) => {
                for field in &object.fields {
                    referenced.insert(named_type(&field.field_type).to_string());
                    visit_input_values(&field.arguments, &mut referenced);
                }
            }
            Definition::TypeDefinition(TypeDefinition::Interface(interface)) => {
                for field in &interface.fields {
                    referenced.insert(named_type(&field.field_type).to_string());
                    visit_input_values(&field.arguments, &mut referenced);
                }
            }
            Definition::TypeDefinition(TypeDefinition::InputObject(input)) => {
                visit_input_values(&input.fields, &mut referenced);
            }
            Definition::DirectiveDefinition(directive) => {
                visit_input_values(&directive.arguments, &mut referenced);
            }
            _ => {}
        }
    }

    referenced
}

fn add_introspection_entry_points(document: &mut SchemaDocument, query_type: &str) {
    let query = document
        .definitions
        .iter_mut()
        .find_map(|definition| match definition {
            Definition::TypeDefinition(TypeDefinition::Object(object))
                if object.name == query_type =>
            {
                Some(object)
            }
            _ => None,
        });

    let Some(query) = query else {
        return;
    };

    query.fields.push(Field {
        position: Pos::default(),
        description: None,
        name: "__schema".to_string(),
        arguments: vec![],
        field_type: Type::NonNullType(Box::new(Type::NamedType("__Schema".to_string()))),
        directives: vec![],
    });
    query.fields.push(Field {
        position: Pos::default(),
        description: None,
        name: "__type".to_string(),
        arguments: vec![InputValue {
            position: Pos::default(),
            description: None,
            name: "name".to_string(),
            value_type: Type::NonNullType(Box::new(Type::NamedType("String".to_string()))),
            default_value: None,
            directives: vec![],
        }],
        field_type: Type::NamedType("__Type".to_string()),
        directives: vec![],
    });
}
