use std::collections::{HashMap, HashSet};

use graphql_tools::parser::schema::{
    Definition, Field, SchemaDefinition, TypeDefinition, TypeExtension,
};
use tracing::{debug, warn};

use crate::{
    closure::TypeClosure,
    error::SchemaFilterError,
    rules::FilterRules,
    schema::{type_definition_name, OperationKind, RootOperationTypes, SchemaIndex},
    transformer::{SchemaTransformer, Transformed},
    SchemaDocument,
};

/// What a filtered document exposes, in source declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exposure {
    pub query: Vec<String>,
    pub mutation: Vec<String>,
    pub subscription: Vec<String>,
    /// Kept non-root types, sorted by name.
    pub types: Vec<String>,
}

impl Exposure {
    pub fn root_fields(&self, kind: OperationKind) -> &[String] {
        match kind {
            OperationKind::Query => &self.query,
            OperationKind::Mutation => &self.mutation,
            OperationKind::Subscription => &self.subscription,
        }
    }

    fn root_fields_mut(&mut self, kind: OperationKind) -> &mut Vec<String> {
        match kind {
            OperationKind::Query => &mut self.query,
            OperationKind::Mutation => &mut self.mutation,
            OperationKind::Subscription => &mut self.subscription,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilteredDocument {
    pub document: SchemaDocument,
    pub exposure: Exposure,
}

/// Derives the visible subset of a schema document from a rule table.
pub struct SchemaFilter;

impl SchemaFilter {
    pub fn apply(
        document: &SchemaDocument,
        rules: &FilterRules,
    ) -> Result<FilteredDocument, SchemaFilterError> {
        let index = SchemaIndex::new(document);
        Self::check_selectors(&index, rules)?;

        let mut exposure = Exposure::default();
        let mut retained_fields: Vec<&Field<'static, String>> = Vec::new();

        for (kind, type_name) in index.roots.iter() {
            let Some(TypeDefinition::Object(root_type)) = index.type_definition(type_name) else {
                continue;
            };

            for field in &root_type.fields {
                if rules.resolve(&field.name) {
                    exposure.root_fields_mut(kind).push(field.name.clone());
                    retained_fields.push(field);
                }
            }
        }

        if exposure.query.is_empty() {
            return Err(SchemaFilterError::EmptyExposure {
                type_name: index
                    .roots
                    .query
                    .clone()
                    .unwrap_or_else(|| "Query".to_string()),
            });
        }

        let mut closure = TypeClosure::new(&index);
        for field in retained_fields.iter().copied() {
            closure.visit_field(field);
        }
        for type_name in index.type_names() {
            if !index.roots.is_root(type_name) && rules.resolve(type_name) {
                closure.visit_named(type_name);
            }
        }
        for definition in &document.definitions {
            if let Definition::DirectiveDefinition(directive) = definition {
                closure.visit_input_values(&directive.arguments);
            }
        }
        let closed = closure.close();

        let mut kept_roots = HashSet::new();
        for (kind, type_name) in index.roots.iter() {
            if !exposure.root_fields(kind).is_empty() {
                kept_roots.insert(type_name);
            }
        }
        if let Some(type_name) = closed
            .referenced_roots
            .iter()
            .find(|name| !kept_roots.contains(*name))
        {
            return Err(SchemaFilterError::EmptyExposure {
                type_name: type_name.to_string(),
            });
        }

        let mut types: Vec<String> = closed.types.iter().map(|name| name.to_string()).collect();
        types.sort();
        exposure.types = types;

        debug!(
            query = ?exposure.query,
            mutation = ?exposure.mutation,
            subscription = ?exposure.subscription,
            types = exposure.types.len(),
            "visibility filter applied"
        );

        let document = {
            let mut pruner = VisibilityPruner {
                roots: &index.roots,
                root_fields: index
                    .roots
                    .iter()
                    .map(|(kind, type_name)| {
                        let fields = exposure.root_fields(kind).iter().map(String::as_str);
                        (type_name, fields.collect())
                    })
                    .collect(),
                kept_types: &closed.types,
            };
            pruner.transform_document(document)
        };

        Ok(FilteredDocument { document, exposure })
    }

    fn check_selectors(index: &SchemaIndex<'_>, rules: &FilterRules) -> Result<(), SchemaFilterError> {
        let mut unknown_selectors: Vec<String> = rules
            .exact_selectors()
            .filter(|selector| !index.is_root_field(selector) && !index.has_type(selector))
            .map(str::to_string)
            .collect();

        if unknown_selectors.is_empty() {
            return Ok(());
        }

        unknown_selectors.sort();
        Err(SchemaFilterError::Configuration { unknown_selectors })
    }
}

struct VisibilityPruner<'a> {
    roots: &'a RootOperationTypes,
    root_fields: HashMap<&'a str, HashSet<&'a str>>,
    kept_types: &'a HashSet<&'a str>,
}

impl VisibilityPruner<'_> {
    fn keeps_root(&self, type_name: Option<&str>) -> bool {
        type_name.is_some_and(|name| {
            self.root_fields
                .get(name)
                .is_some_and(|fields| !fields.is_empty())
        })
    }
}

impl SchemaTransformer for VisibilityPruner<'_> {
    fn transform_schema_definition(
        &mut self,
        schema: &SchemaDefinition<'static, String>,
    ) -> Transformed<SchemaDefinition<'static, String>> {
        let keep_mutation = self.keeps_root(schema.mutation.as_deref());
        let keep_subscription = self.keeps_root(schema.subscription.as_deref());

        if keep_mutation == schema.mutation.is_some()
            && keep_subscription == schema.subscription.is_some()
        {
            return Transformed::Keep;
        }

        Transformed::Replace(SchemaDefinition {
            position: schema.position,
            directives: schema.directives.clone(),
            query: schema.query.clone(),
            mutation: schema.mutation.clone().filter(|_| keep_mutation),
            subscription: schema.subscription.clone().filter(|_| keep_subscription),
        })
    }

    fn transform_type_extension(
        &mut self,
        _extension: &TypeExtension<'static, String>,
    ) -> Transformed<TypeExtension<'static, String>> {
        warn!("type extensions are not supported by the visibility filter and were dropped");
        Transformed::Remove
    }

    fn transform_type_definition(
        &mut self,
        type_def: &TypeDefinition<'static, String>,
    ) -> Transformed<TypeDefinition<'static, String>> {
        let name = type_definition_name(type_def);

        if self.roots.is_root(name) {
            if !self.keeps_root(Some(name)) {
                return Transformed::Remove;
            }
            return self.default_transform_type_definition(type_def);
        }

        if self.kept_types.contains(name) {
            Transformed::Keep
        } else {
            Transformed::Remove
        }
    }

    fn transform_field(
        &mut self,
        parent_type: &str,
        field: &Field<'static, String>,
    ) -> Transformed<Field<'static, String>> {
        match self.root_fields.get(parent_type) {
            Some(exposed) if !exposed.contains(field.name.as_str()) => Transformed::Remove,
            _ => Transformed::Keep,
        }
    }
}
