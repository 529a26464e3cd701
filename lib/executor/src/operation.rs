use std::collections::{HashMap, HashSet};

use gateway_schema_filter::OperationKind;
use graphql_tools::parser::query::{
    Definition, Directive, Field, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet, TypeCondition, Value as AstValue, VariableDefinition,
};
use serde_json::{Map, Number, Value};

use crate::error::OperationError;

pub type QueryDocument = graphql_tools::parser::query::Document<'static, String>;
pub type StaticField = Field<'static, String>;
pub type StaticSelectionSet = SelectionSet<'static, String>;
pub type Fragments<'d> = HashMap<&'d str, &'d FragmentDefinition<'static, String>>;

pub fn parse_operation(query: &str) -> Result<QueryDocument, graphql_tools::parser::query::ParseError> {
    Ok(graphql_tools::parser::parse_query::<String>(query)?.into_static())
}

/// The executable operation picked out of a document.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedOperation<'d> {
    pub kind: OperationKind,
    pub name: Option<&'d str>,
    pub variable_definitions: &'d [VariableDefinition<'static, String>],
    pub directives: &'d [Directive<'static, String>],
    pub selection_set: &'d StaticSelectionSet,
}

impl<'d> From<&'d OperationDefinition<'static, String>> for ResolvedOperation<'d> {
    fn from(operation: &'d OperationDefinition<'static, String>) -> Self {
        match operation {
            OperationDefinition::SelectionSet(selection_set) => ResolvedOperation {
                kind: OperationKind::Query,
                name: None,
                variable_definitions: &[],
                directives: &[],
                selection_set,
            },
            OperationDefinition::Query(query) => ResolvedOperation {
                kind: OperationKind::Query,
                name: query.name.as_deref(),
                variable_definitions: &query.variable_definitions,
                directives: &query.directives,
                selection_set: &query.selection_set,
            },
            OperationDefinition::Mutation(mutation) => ResolvedOperation {
                kind: OperationKind::Mutation,
                name: mutation.name.as_deref(),
                variable_definitions: &mutation.variable_definitions,
                directives: &mutation.directives,
                selection_set: &mutation.selection_set,
            },
            OperationDefinition::Subscription(subscription) => ResolvedOperation {
                kind: OperationKind::Subscription,
                name: subscription.name.as_deref(),
                variable_definitions: &subscription.variable_definitions,
                directives: &subscription.directives,
                selection_set: &subscription.selection_set,
            },
        }
    }
}

pub fn operations(document: &QueryDocument) -> impl Iterator<Item = ResolvedOperation<'_>> {
    document.definitions.iter().filter_map(|definition| match definition {
        Definition::Operation(operation) => Some(ResolvedOperation::from(operation)),
        Definition::Fragment(_) => None,
    })
}

/// Picks the operation to run, by name when the document has several.
pub fn resolve_operation<'d>(
    document: &'d QueryDocument,
    operation_name: Option<&str>,
) -> Result<ResolvedOperation<'d>, OperationError> {
    match operation_name {
        Some(operation_name) => operations(document)
            .find(|operation| operation.name == Some(operation_name))
            .ok_or_else(|| OperationError::SpecifiedOperationNotFound {
                operation_name: operation_name.to_string(),
            }),
        None => {
            let mut all = operations(document);
            let first = all.next().ok_or(OperationError::OperationNotFound)?;
            if all.next().is_some() {
                return Err(OperationError::MultipleOperationsWithoutName);
            }
            Ok(first)
        }
    }
}

pub fn fragments(document: &QueryDocument) -> Fragments<'_> {
    document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
            Definition::Operation(_) => None,
        })
        .collect()
}

/// Provided variables completed with the defaults of the operation.
pub fn variable_values(
    operation: &ResolvedOperation<'_>,
    provided: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut values = provided.cloned().unwrap_or_default();
    let empty = Map::new();

    for definition in operation.variable_definitions {
        if values.contains_key(&definition.name) {
            continue;
        }
        if let Some(default_value) = &definition.default_value {
            values.insert(definition.name.clone(), value_to_json(default_value, &empty));
        }
    }

    values
}

pub fn value_to_json(value: &AstValue<'static, String>, variables: &Map<String, Value>) -> Value {
    match value {
        AstValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        AstValue::Int(number) => number
            .as_i64()
            .map(|number| Value::Number(number.into()))
            .unwrap_or(Value::Null),
        AstValue::Float(number) => Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AstValue::String(string) => Value::String(string.clone()),
        AstValue::Boolean(boolean) => Value::Bool(*boolean),
        AstValue::Null => Value::Null,
        AstValue::Enum(name) => Value::String(name.clone()),
        AstValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| value_to_json(item, variables))
                .collect(),
        ),
        AstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), value_to_json(value, variables)))
                .collect(),
        ),
    }
}

pub fn argument_value(
    field: &StaticField,
    name: &str,
    variables: &Map<String, Value>,
) -> Option<Value> {
    field
        .arguments
        .iter()
        .find(|(argument, _)| argument == name)
        .map(|(_, value)| value_to_json(value, variables))
        .filter(|value| !value.is_null())
}

/// Evaluates `@skip` and `@include`.
pub fn should_include(directives: &[Directive<'static, String>], variables: &Map<String, Value>) -> bool {
    let condition = |name: &str| {
        directives
            .iter()
            .find(|directive| directive.name == name)
            .and_then(|directive| {
                directive
                    .arguments
                    .iter()
                    .find(|(argument, _)| argument == "if")
            })
            .map(|(_, value)| value_to_json(value, variables) == Value::Bool(true))
    };

    condition("skip") != Some(true) && condition("include") != Some(false)
}

/// Fields of a selection set grouped by response key, in selection order.
pub type CollectedFields<'d> = Vec<(&'d str, Vec<&'d StaticField>)>;

pub fn response_key<'a>(field: &'a StaticField) -> &'a str {
    field.alias.as_deref().unwrap_or(&field.name)
}

/// Flattens fragments applying to `type_name` and groups fields by response key.
pub fn collect_fields<'d>(
    selection_set: &'d StaticSelectionSet,
    type_name: &str,
    fragments: &Fragments<'d>,
    variables: &Map<String, Value>,
) -> CollectedFields<'d> {
    let mut collected = Vec::new();
    let mut visited_fragments = HashSet::new();
    collect_fields_into(
        selection_set,
        type_name,
        fragments,
        variables,
        &mut visited_fragments,
        &mut collected,
    );
    collected
}

fn collect_fields_into<'d>(
    selection_set: &'d StaticSelectionSet,
    type_name: &str,
    fragments: &Fragments<'d>,
    variables: &Map<String, Value>,
    visited_fragments: &mut HashSet<&'d str>,
    collected: &mut CollectedFields<'d>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                if !should_include(&field.directives, variables) {
                    continue;
                }
                let key = response_key(field);
                match collected.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, group)) => group.push(field),
                    None => collected.push((key, vec![field])),
                }
            }
            Selection::InlineFragment(inline) => {
                let applies = match &inline.type_condition {
                    Some(TypeCondition::On(condition)) => condition == type_name,
                    None => true,
                };
                if applies && should_include(&inline.directives, variables) {
                    collect_fields_into(
                        &inline.selection_set,
                        type_name,
                        fragments,
                        variables,
                        visited_fragments,
                        collected,
                    );
                }
            }
            Selection::FragmentSpread(spread) => {
                if !should_include(&spread.directives, variables) {
                    continue;
                }
                let Some(fragment) = fragments.get(spread.fragment_name.as_str()) else {
                    continue;
                };
                let TypeCondition::On(condition) = &fragment.type_condition;
                if condition != type_name || !visited_fragments.insert(fragment.name.as_str()) {
                    continue;
                }
                collect_fields_into(
                    &fragment.selection_set,
                    type_name,
                    fragments,
                    variables,
                    visited_fragments,
                    collected,
                );
            }
        }
    }
}

/// Names of the variables and fragments a selection set depends on, transitively.
#[derive(Debug, Default)]
pub struct Usages<'d> {
    pub variables: HashSet<&'d str>,
    pub fragments: HashSet<&'d str>,
}

impl<'d> Usages<'d> {
    pub fn of_selection_set(selection_set: &'d StaticSelectionSet, fragments: &Fragments<'d>) -> Self {
        let mut usages = Usages::default();
        usages.visit_selection_set(selection_set, fragments);
        usages
    }

    fn visit_selection_set(&mut self, selection_set: &'d StaticSelectionSet, fragments: &Fragments<'d>) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    self.visit_directives(&field.directives);
                    for (_, value) in &field.arguments {
                        self.visit_value(value);
                    }
                    self.visit_selection_set(&field.selection_set, fragments);
                }
                Selection::InlineFragment(inline) => {
                    self.visit_directives(&inline.directives);
                    self.visit_selection_set(&inline.selection_set, fragments);
                }
                Selection::FragmentSpread(spread) => {
                    self.visit_directives(&spread.directives);
                    if let Some(fragment) = fragments.get(spread.fragment_name.as_str()) {
                        if self.fragments.insert(fragment.name.as_str()) {
                            self.visit_directives(&fragment.directives);
                            self.visit_selection_set(&fragment.selection_set, fragments);
                        }
                    }
                }
            }
        }
    }

    fn visit_directives(&mut self, directives: &'d [Directive<'static, String>]) {
        for directive in directives {
            for (_, value) in &directive.arguments {
                self.visit_value(value);
            }
        }
    }

    fn visit_value(&mut self, value: &'d AstValue<'static, String>) {
        match value {
            AstValue::Variable(name) => {
                self.variables.insert(name.as_str());
            }
            AstValue::List(items) => items.iter().for_each(|item| self.visit_value(item)),
            AstValue::Object(fields) => fields.values().for_each(|field| self.visit_value(field)),
            _ => {}
        }
    }
}
