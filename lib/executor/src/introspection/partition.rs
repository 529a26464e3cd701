use std::collections::HashSet;

use gateway_schema_filter::OperationKind;
use graphql_tools::parser::query::{
    Definition, InlineFragment, Mutation, OperationDefinition, Query, Selection, SelectionSet,
    Subscription, TypeCondition,
};

use crate::operation::{
    Fragments, QueryDocument, ResolvedOperation, StaticSelectionSet, Usages,
};

pub fn is_introspection_field_name(name: &str) -> bool {
    name.starts_with("__")
}

/// Whether the root selection asks for `__schema`, `__type` or `__typename`,
/// directly or through fragments.
pub fn has_introspection_root_fields(selection_set: &StaticSelectionSet, fragments: &Fragments<'_>) -> bool {
    selection_set.items.iter().any(|selection| match selection {
        Selection::Field(field) => is_introspection_field_name(&field.name),
        Selection::InlineFragment(inline) => {
            has_introspection_root_fields(&inline.selection_set, fragments)
        }
        Selection::FragmentSpread(spread) => fragments
            .get(spread.fragment_name.as_str())
            .is_some_and(|fragment| has_introspection_root_fields(&fragment.selection_set, fragments)),
    })
}

/// Rebuilds the operation without its root introspection fields, for the
/// source schema to execute.
///
/// Root fragment spreads become inline fragments, so only the variables and
/// fragments still in use are carried over. Returns `None` when nothing is
/// left to execute downstream.
pub fn downstream_operation(
    document: &QueryDocument,
    operation: &ResolvedOperation<'_>,
    fragments: &Fragments<'_>,
) -> Option<QueryDocument> {
    let mut path = HashSet::new();
    let selection_set = strip_root_introspection(operation.selection_set, fragments, &mut path);
    if selection_set.items.is_empty() {
        return None;
    }

    let usages = Usages::of_selection_set(&selection_set, fragments);
    let variable_definitions = operation
        .variable_definitions
        .iter()
        .filter(|definition| usages.variables.contains(definition.name.as_str()))
        .cloned()
        .collect();
    let used_fragments: Vec<_> = document
        .definitions
        .iter()
        .filter(|definition| {
            matches!(definition, Definition::Fragment(fragment) if usages.fragments.contains(fragment.name.as_str()))
        })
        .cloned()
        .collect();
    drop(usages);
    let name = operation.name.map(str::to_string);
    let directives = operation.directives.to_vec();
    let position = selection_set.span.0;

    let shorthand = operation.name.is_none()
        && operation.variable_definitions.is_empty()
        && operation.directives.is_empty();

    let operation_definition = match operation.kind {
        OperationKind::Query if shorthand => OperationDefinition::SelectionSet(selection_set),
        OperationKind::Query => OperationDefinition::Query(Query {
            position,
            name,
            variable_definitions,
            directives,
            selection_set,
        }),
        OperationKind::Mutation => OperationDefinition::Mutation(Mutation {
            position,
            name,
            variable_definitions,
            directives,
            selection_set,
        }),
        OperationKind::Subscription => OperationDefinition::Subscription(Subscription {
            position,
            name,
            variable_definitions,
            directives,
            selection_set,
        }),
    };

    let mut definitions = vec![Definition::Operation(operation_definition)];
    definitions.extend(used_fragments);

    Some(QueryDocument { definitions })
}

fn strip_root_introspection<'d>(
    selection_set: &'d StaticSelectionSet,
    fragments: &Fragments<'d>,
    path: &mut HashSet<&'d str>,
) -> StaticSelectionSet {
    let mut items = Vec::with_capacity(selection_set.items.len());

    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                if !is_introspection_field_name(&field.name) {
                    items.push(selection.clone());
                }
            }
            Selection::InlineFragment(inline) => {
                let stripped = strip_root_introspection(&inline.selection_set, fragments, path);
                if !stripped.items.is_empty() {
                    items.push(Selection::InlineFragment(InlineFragment {
                        selection_set: stripped,
                        ..inline.clone()
                    }));
                }
            }
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = fragments.get(spread.fragment_name.as_str()) else {
                    continue;
                };
                if !path.insert(fragment.name.as_str()) {
                    continue;
                }
                let stripped = strip_root_introspection(&fragment.selection_set, fragments, path);
                path.remove(fragment.name.as_str());

                if !stripped.items.is_empty() {
                    let TypeCondition::On(type_name) = &fragment.type_condition;
                    items.push(Selection::InlineFragment(InlineFragment {
                        position: spread.position,
                        type_condition: Some(TypeCondition::On(type_name.clone())),
                        directives: spread.directives.clone(),
                        selection_set: stripped,
                    }));
                }
            }
        }
    }

    SelectionSet {
        span: selection_set.span,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::{downstream_operation, has_introspection_root_fields};
    use crate::operation::{fragments, parse_operation, resolve_operation};

    fn downstream(query: &str) -> Option<String> {
        let document = parse_operation(query).unwrap();
        let operation = resolve_operation(&document, None).unwrap();
        let fragments = fragments(&document);

        downstream_operation(&document, &operation, &fragments).map(|doc| doc.to_string())
    }

    #[test]
    fn detects_introspection_behind_fragments() {
        let document = parse_operation("{ ...Meta } fragment Meta on Query { __typename }").unwrap();
        let operation = resolve_operation(&document, None).unwrap();

        assert!(has_introspection_root_fields(operation.selection_set, &fragments(&document)));
    }

    #[test]
    fn plain_operations_have_no_introspection() {
        let document = parse_operation("{ author(id: 1) { __typename id } }").unwrap();
        let operation = resolve_operation(&document, None).unwrap();

        assert!(!has_introspection_root_fields(operation.selection_set, &fragments(&document)));
    }

    #[test]
    fn pure_introspection_has_no_downstream_part() {
        assert_eq!(downstream("{ __schema { queryType { name } } __typename }"), None);
    }

    #[test]
    fn removes_root_introspection_and_unused_variables() {
        let printed = downstream(
            r#"query Mixed($id: Int!, $name: String!) {
                __type(name: $name) { name }
                author(id: $id) { __typename firstName }
            }"#,
        )
        .unwrap();

        insta::assert_snapshot!(printed, @r###"
        query Mixed($id: Int!) {
          author(id: $id) {
            __typename
            firstName
          }
        }
        "###);
    }

    #[test]
    fn inlines_root_fragments_and_keeps_nested_ones() {
        let printed = downstream(
            r#"{ ...Root }
               fragment Root on Query { __typename author(id: 1) { ...Names } }
               fragment Names on Author { firstName lastName }
               fragment Unused on Query { posts { id } }"#,
        )
        .unwrap();

        insta::assert_snapshot!(printed, @r###"
        {
          ... on Query {
            author(id: 1) {
              ...Names
            }
          }
        }

        fragment Names on Author {
          firstName
          lastName
        }
        "###);
    }
}
