use std::collections::HashMap;

use graphql_tools::parser::schema::{Definition, Type, TypeDefinition};

use crate::SchemaDocument;

pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// Unwraps list and non-null wrappers down to the referenced type name.
pub fn named_type<'a>(ty: &'a Type<'static, String>) -> &'a str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}

pub fn type_definition_name<'a>(type_def: &'a TypeDefinition<'static, String>) -> &'a str {
    match type_def {
        TypeDefinition::Scalar(scalar) => &scalar.name,
        TypeDefinition::Object(obj) => &obj.name,
        TypeDefinition::Interface(interface) => &interface.name,
        TypeDefinition::Union(union) => &union.name,
        TypeDefinition::Enum(enm) => &enm.name,
        TypeDefinition::InputObject(input) => &input.name,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Query,
        OperationKind::Mutation,
        OperationKind::Subscription,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }

    fn default_type_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

/// Names of the root operation types of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootOperationTypes {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl RootOperationTypes {
    /// Reads the `schema { ... }` definition, falling back to the conventional
    /// `Query`/`Mutation`/`Subscription` names when the document has none.
    pub fn from_document(document: &SchemaDocument) -> Self {
        let schema_definition = document.definitions.iter().find_map(|def| match def {
            Definition::SchemaDefinition(schema) => Some(schema),
            _ => None,
        });

        if let Some(schema) = schema_definition {
            return Self {
                query: schema.query.clone(),
                mutation: schema.mutation.clone(),
                subscription: schema.subscription.clone(),
            };
        }

        let has_object_type = |name: &str| {
            document.definitions.iter().any(|def| {
                matches!(def, Definition::TypeDefinition(TypeDefinition::Object(obj)) if obj.name == name)
            })
        };
        let default_for = |kind: OperationKind| {
            let name = kind.default_type_name();
            has_object_type(name).then(|| name.to_string())
        };

        Self {
            query: default_for(OperationKind::Query),
            mutation: default_for(OperationKind::Mutation),
            subscription: default_for(OperationKind::Subscription),
        }
    }

    pub fn get(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => self.query.as_deref(),
            OperationKind::Mutation => self.mutation.as_deref(),
            OperationKind::Subscription => self.subscription.as_deref(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OperationKind, &str)> {
        OperationKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|name| (kind, name)))
    }

    pub fn kind_of(&self, type_name: &str) -> Option<OperationKind> {
        self.iter()
            .find(|(_, name)| *name == type_name)
            .map(|(kind, _)| kind)
    }

    pub fn is_root(&self, type_name: &str) -> bool {
        self.kind_of(type_name).is_some()
    }
}

/// Name-keyed view over the type definitions of a document.
pub(crate) struct SchemaIndex<'d> {
    pub roots: RootOperationTypes,
    types: HashMap<&'d str, &'d TypeDefinition<'static, String>>,
    implementations: HashMap<&'d str, Vec<&'d str>>,
}

impl<'d> SchemaIndex<'d> {
    pub fn new(document: &'d SchemaDocument) -> Self {
        let mut types = HashMap::new();
        let mut implementations: HashMap<&'d str, Vec<&'d str>> = HashMap::new();

        for definition in &document.definitions {
            let Definition::TypeDefinition(type_def) = definition else {
                continue;
            };
            let name = type_definition_name(type_def);
            types.insert(name, type_def);

            let interfaces = match type_def {
                TypeDefinition::Object(obj) => &obj.implements_interfaces,
                TypeDefinition::Interface(interface) => &interface.implements_interfaces,
                _ => continue,
            };
            for interface in interfaces {
                implementations
                    .entry(interface.as_str())
                    .or_default()
                    .push(name);
            }
        }

        Self {
            roots: RootOperationTypes::from_document(document),
            types,
            implementations,
        }
    }

    pub fn type_definition(&self, name: &str) -> Option<&'d TypeDefinition<'static, String>> {
        self.types.get(name).copied()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'d str> + '_ {
        self.types.keys().copied()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name) || is_builtin_scalar(name)
    }

    pub fn implementations_of(&self, interface: &str) -> &[&'d str] {
        self.implementations
            .get(interface)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_root_field(&self, name: &str) -> bool {
        self.roots.iter().any(|(_, type_name)| {
            matches!(
                self.type_definition(type_name),
                Some(TypeDefinition::Object(obj)) if obj.fields.iter().any(|f| f.name == name)
            )
        })
    }
}
