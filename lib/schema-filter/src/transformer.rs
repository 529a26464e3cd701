use graphql_tools::parser::schema::{
    Definition, DirectiveDefinition, Document, Field, InterfaceType, ObjectType, SchemaDefinition,
    TypeDefinition, TypeExtension,
};

use crate::SchemaDocument;

type StaticDefinition = Definition<'static, String>;

/// Outcome of visiting a single node of a schema document.
#[derive(Clone, Debug)]
pub enum Transformed<T> {
    Keep,
    Remove,
    Replace(T),
}

impl<T> Transformed<T> {
    pub fn map<U, F>(self, f: F) -> Transformed<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Transformed::Keep => Transformed::Keep,
            Transformed::Remove => Transformed::Remove,
            Transformed::Replace(t) => Transformed::Replace(f(t)),
        }
    }
}

/// Outcome of visiting a list of nodes: either nothing changed, or the new list.
#[derive(Clone, Debug)]
pub enum TransformedValue<T> {
    Keep,
    Replace(T),
}

impl<T> TransformedValue<T> {
    pub fn should_keep(&self) -> bool {
        matches!(self, TransformedValue::Keep)
    }

    pub fn replace_or_else<F>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            TransformedValue::Keep => f(),
            TransformedValue::Replace(next_value) => next_value,
        }
    }
}

/// A copy-on-write walk over a schema document.
///
/// Every hook defaults to [`Transformed::Keep`]; implementors override the nodes
/// they care about. Untouched subtrees are cloned only when a sibling changed, so
/// a transformer that keeps everything returns the source definitions as-is.
pub trait SchemaTransformer {
    fn transform_document(&mut self, document: &SchemaDocument) -> SchemaDocument {
        self.default_transform_document(document)
    }

    fn default_transform_document(&mut self, document: &SchemaDocument) -> SchemaDocument {
        let definitions = self
            .transform_list(&document.definitions, Self::transform_definition)
            .replace_or_else(|| document.definitions.clone());

        Document { definitions }
    }

    fn transform_definition(
        &mut self,
        definition: &StaticDefinition,
    ) -> Transformed<StaticDefinition> {
        match definition {
            Definition::SchemaDefinition(schema) => self
                .transform_schema_definition(schema)
                .map(Definition::SchemaDefinition),
            Definition::TypeDefinition(type_def) => self
                .transform_type_definition(type_def)
                .map(Definition::TypeDefinition),
            Definition::TypeExtension(extension) => self
                .transform_type_extension(extension)
                .map(Definition::TypeExtension),
            Definition::DirectiveDefinition(directive) => self
                .transform_directive_definition(directive)
                .map(Definition::DirectiveDefinition),
        }
    }

    fn transform_schema_definition(
        &mut self,
        _schema: &SchemaDefinition<'static, String>,
    ) -> Transformed<SchemaDefinition<'static, String>> {
        Transformed::Keep
    }

    fn transform_type_extension(
        &mut self,
        _extension: &TypeExtension<'static, String>,
    ) -> Transformed<TypeExtension<'static, String>> {
        Transformed::Keep
    }

    fn transform_directive_definition(
        &mut self,
        _directive: &DirectiveDefinition<'static, String>,
    ) -> Transformed<DirectiveDefinition<'static, String>> {
        Transformed::Keep
    }

    fn transform_type_definition(
        &mut self,
        type_def: &TypeDefinition<'static, String>,
    ) -> Transformed<TypeDefinition<'static, String>> {
        self.default_transform_type_definition(type_def)
    }

    fn default_transform_type_definition(
        &mut self,
        type_def: &TypeDefinition<'static, String>,
    ) -> Transformed<TypeDefinition<'static, String>> {
        match type_def {
            TypeDefinition::Object(obj) => {
                self.transform_object_type(obj).map(TypeDefinition::Object)
            }
            TypeDefinition::Interface(interface) => self
                .transform_interface_type(interface)
                .map(TypeDefinition::Interface),
            TypeDefinition::Scalar(_)
            | TypeDefinition::Union(_)
            | TypeDefinition::Enum(_)
            | TypeDefinition::InputObject(_) => Transformed::Keep,
        }
    }

    fn transform_object_type(
        &mut self,
        obj: &ObjectType<'static, String>,
    ) -> Transformed<ObjectType<'static, String>> {
        let fields = self.transform_fields(&obj.name, &obj.fields);

        if fields.should_keep() {
            return Transformed::Keep;
        }

        Transformed::Replace(ObjectType {
            position: obj.position,
            description: obj.description.clone(),
            name: obj.name.clone(),
            implements_interfaces: obj.implements_interfaces.clone(),
            directives: obj.directives.clone(),
            fields: fields.replace_or_else(|| obj.fields.clone()),
        })
    }

    fn transform_interface_type(
        &mut self,
        interface: &InterfaceType<'static, String>,
    ) -> Transformed<InterfaceType<'static, String>> {
        let fields = self.transform_fields(&interface.name, &interface.fields);

        if fields.should_keep() {
            return Transformed::Keep;
        }

        Transformed::Replace(InterfaceType {
            position: interface.position,
            description: interface.description.clone(),
            name: interface.name.clone(),
            implements_interfaces: interface.implements_interfaces.clone(),
            directives: interface.directives.clone(),
            fields: fields.replace_or_else(|| interface.fields.clone()),
        })
    }

    fn transform_fields(
        &mut self,
        parent_type: &str,
        fields: &[Field<'static, String>],
    ) -> TransformedValue<Vec<Field<'static, String>>> {
        self.transform_list(fields, |this, field| this.transform_field(parent_type, field))
    }

    fn transform_field(
        &mut self,
        _parent_type: &str,
        _field: &Field<'static, String>,
    ) -> Transformed<Field<'static, String>> {
        Transformed::Keep
    }

    fn transform_list<I, F>(&mut self, list: &[I], f: F) -> TransformedValue<Vec<I>>
    where
        I: Clone,
        F: Fn(&mut Self, &I) -> Transformed<I>,
    {
        let mut result = Vec::new();
        let mut has_changes = false;

        for (index, prev_item) in list.iter().enumerate() {
            match f(self, prev_item) {
                Transformed::Keep => {
                    if has_changes {
                        result.push(prev_item.clone());
                    }
                }
                Transformed::Remove => {
                    if !has_changes {
                        result.reserve(list.len());
                        result.extend(list.iter().take(index).cloned());
                        has_changes = true;
                    }
                }
                Transformed::Replace(next_item) => {
                    if !has_changes {
                        result.reserve(list.len());
                        result.extend(list.iter().take(index).cloned());
                        has_changes = true;
                    }
                    result.push(next_item);
                }
            }
        }

        if has_changes {
            TransformedValue::Replace(result)
        } else {
            TransformedValue::Keep
        }
    }
}
