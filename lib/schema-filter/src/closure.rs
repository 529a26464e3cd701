use std::collections::HashSet;

use graphql_tools::parser::schema::{Field, InputValue, Type, TypeDefinition};

use crate::schema::{named_type, SchemaIndex};

/// Collects every type transitively reachable from a set of seeds.
///
/// Root operation types are never walked into: their visible fields are decided by
/// the rule table, so a reference to one is only recorded.
pub(crate) struct TypeClosure<'i, 'd> {
    index: &'i SchemaIndex<'d>,
    reached: HashSet<&'d str>,
    referenced_roots: HashSet<&'d str>,
    queue: Vec<&'d str>,
}

pub(crate) struct ClosedTypes<'d> {
    pub types: HashSet<&'d str>,
    pub referenced_roots: HashSet<&'d str>,
}

impl<'i, 'd> TypeClosure<'i, 'd> {
    pub fn new(index: &'i SchemaIndex<'d>) -> Self {
        Self {
            index,
            reached: HashSet::new(),
            referenced_roots: HashSet::new(),
            queue: Vec::new(),
        }
    }

    pub fn visit_named(&mut self, name: &'d str) {
        if self.index.roots.is_root(name) {
            self.referenced_roots.insert(name);
            return;
        }

        // built-in scalars are usually not declared, nothing to keep for them
        if self.index.type_definition(name).is_none() {
            return;
        }

        if self.reached.insert(name) {
            self.queue.push(name);
        }
    }

    pub fn visit_type_ref(&mut self, ty: &'d Type<'static, String>) {
        self.visit_named(named_type(ty));
    }

    pub fn visit_input_values(&mut self, values: &'d [InputValue<'static, String>]) {
        for value in values {
            self.visit_type_ref(&value.value_type);
        }
    }

    pub fn visit_field(&mut self, field: &'d Field<'static, String>) {
        self.visit_type_ref(&field.field_type);
        self.visit_input_values(&field.arguments);
    }

    pub fn close(mut self) -> ClosedTypes<'d> {
        let index = self.index;

        while let Some(name) = self.queue.pop() {
            let Some(type_def) = index.type_definition(name) else {
                continue;
            };

            match type_def {
                TypeDefinition::Object(obj) => {
                    for interface in &obj.implements_interfaces {
                        self.visit_named(interface);
                    }
                    for field in &obj.fields {
                        self.visit_field(field);
                    }
                }
                TypeDefinition::Interface(interface) => {
                    for parent in &interface.implements_interfaces {
                        self.visit_named(parent);
                    }
                    for field in &interface.fields {
                        self.visit_field(field);
                    }
                    // fragments on the interface may target any implementation
                    for implementation in index.implementations_of(&interface.name) {
                        self.visit_named(*implementation);
                    }
                }
                TypeDefinition::Union(union) => {
                    for member in &union.types {
                        self.visit_named(member);
                    }
                }
                TypeDefinition::InputObject(input) => {
                    self.visit_input_values(&input.fields);
                }
                TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
            }
        }

        ClosedTypes {
            types: self.reached,
            referenced_roots: self.referenced_roots,
        }
    }
}
