use gateway_schema_filter::schema::type_definition_name;
use graphql_tools::parser::schema::{
    Directive, DirectiveDefinition, EnumValue, Field, InputValue, Type, TypeDefinition, Value as SchemaValue,
};
use serde_json::{Map, Value};

use crate::introspection::schema::IntrospectionSchema;
use crate::operation::{argument_value, collect_fields, CollectedFields, Fragments, StaticField};

/// Everything needed to answer `__schema`, `__type` and `__typename` locally.
pub struct IntrospectionContext<'exec> {
    pub schema: &'exec IntrospectionSchema,
    pub fragments: &'exec Fragments<'exec>,
    pub variables: &'exec Map<String, Value>,
}

fn string_or_null(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.clone()))
}

fn deprecation_reason<'a>(directives: &'a [Directive<'static, String>]) -> Option<&'a str> {
    directives
        .iter()
        .find(|d| d.name == "deprecated")
        .map(|d| {
            d.arguments
                .iter()
                .find(|(name, _)| name == "reason")
                .and_then(|(_, value)| match value {
                    SchemaValue::String(reason) => Some(reason.as_str()),
                    _ => None,
                })
                .unwrap_or("No longer supported")
        })
}

fn is_deprecated(directives: &[Directive<'static, String>]) -> bool {
    directives.iter().any(|d| d.name == "deprecated")
}

fn specified_by_url<'a>(directives: &'a [Directive<'static, String>]) -> Option<&'a str> {
    directives
        .iter()
        .find(|d| d.name == "specifiedBy")
        .and_then(|d| d.arguments.iter().find(|(name, _)| name == "url"))
        .and_then(|(_, value)| match value {
            SchemaValue::String(url) => Some(url.as_str()),
            _ => None,
        })
}

fn kind_to_str(type_def: &TypeDefinition<'static, String>) -> &'static str {
    match type_def {
        TypeDefinition::Scalar(_) => "SCALAR",
        TypeDefinition::Object(_) => "OBJECT",
        TypeDefinition::Interface(_) => "INTERFACE",
        TypeDefinition::Union(_) => "UNION",
        TypeDefinition::Enum(_) => "ENUM",
        TypeDefinition::InputObject(_) => "INPUT_OBJECT",
    }
}

fn description<'a>(type_def: &'a TypeDefinition<'static, String>) -> Option<&'a String> {
    match type_def {
        TypeDefinition::Scalar(s) => s.description.as_ref(),
        TypeDefinition::Object(o) => o.description.as_ref(),
        TypeDefinition::Interface(i) => i.description.as_ref(),
        TypeDefinition::Union(u) => u.description.as_ref(),
        TypeDefinition::Enum(e) => e.description.as_ref(),
        TypeDefinition::InputObject(io) => io.description.as_ref(),
    }
}

impl<'exec> IntrospectionContext<'exec> {
    /// Resolves the sub-selections of `fields`, all sharing one response key,
    /// against a value of type `typename`.
    fn resolve_object<F>(&self, fields: &[&'exec StaticField], typename: &str, mut resolve_field: F) -> Value
    where
        F: FnMut(&str, &[&'exec StaticField]) -> Value,
    {
        let mut collected: CollectedFields<'exec> = Vec::new();
        for field in fields {
            for (key, group) in collect_fields(&field.selection_set, typename, self.fragments, self.variables) {
                match collected.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, existing)) => existing.extend(group),
                    None => collected.push((key, group)),
                }
            }
        }

        let mut object = Map::with_capacity(collected.len());
        for (key, group) in collected {
            let value = match group[0].name.as_str() {
                "__typename" => Value::String(typename.to_string()),
                name => resolve_field(name, &group),
            };
            object.insert(key.to_string(), value);
        }
        Value::Object(object)
    }

    fn include_deprecated(&self, fields: &[&'exec StaticField]) -> bool {
        argument_value(fields[0], "includeDeprecated", self.variables)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    fn resolve_input_value(&self, iv: &InputValue<'static, String>, fields: &[&'exec StaticField]) -> Value {
        self.resolve_object(fields, "__InputValue", |name, group| match name {
            "name" => Value::String(iv.name.clone()),
            "description" => string_or_null(iv.description.as_ref()),
            "type" => self.resolve_type(&iv.value_type, group),
            "defaultValue" => iv
                .default_value
                .as_ref()
                .map_or(Value::Null, |value| Value::String(value.to_string())),
            "isDeprecated" => Value::Bool(is_deprecated(&iv.directives)),
            "deprecationReason" => deprecation_reason(&iv.directives)
                .map_or(Value::Null, |reason| Value::String(reason.to_string())),
            _ => Value::Null,
        })
    }

    fn resolve_input_values(&self, values: &[InputValue<'static, String>], fields: &[&'exec StaticField]) -> Value {
        let include_deprecated = self.include_deprecated(fields);
        Value::Array(
            values
                .iter()
                .filter(|iv| include_deprecated || !is_deprecated(&iv.directives))
                .map(|iv| self.resolve_input_value(iv, fields))
                .collect(),
        )
    }

    fn resolve_field(&self, f: &Field<'static, String>, fields: &[&'exec StaticField]) -> Value {
        self.resolve_object(fields, "__Field", |name, group| match name {
            "name" => Value::String(f.name.clone()),
            "description" => string_or_null(f.description.as_ref()),
            "args" => self.resolve_input_values(&f.arguments, group),
            "type" => self.resolve_type(&f.field_type, group),
            "isDeprecated" => Value::Bool(is_deprecated(&f.directives)),
            "deprecationReason" => deprecation_reason(&f.directives)
                .map_or(Value::Null, |reason| Value::String(reason.to_string())),
            _ => Value::Null,
        })
    }

    fn resolve_enum_value(&self, ev: &EnumValue<'static, String>, fields: &[&'exec StaticField]) -> Value {
        self.resolve_object(fields, "__EnumValue", |name, _| match name {
            "name" => Value::String(ev.name.clone()),
            "description" => string_or_null(ev.description.as_ref()),
            "isDeprecated" => Value::Bool(is_deprecated(&ev.directives)),
            "deprecationReason" => deprecation_reason(&ev.directives)
                .map_or(Value::Null, |reason| Value::String(reason.to_string())),
            _ => Value::Null,
        })
    }

    pub fn resolve_type_definition(
        &self,
        type_def: &TypeDefinition<'static, String>,
        fields: &[&'exec StaticField],
    ) -> Value {
        self.resolve_object(fields, "__Type", |name, group| match name {
            "kind" => Value::String(kind_to_str(type_def).to_string()),
            "name" => Value::String(type_definition_name(type_def).to_string()),
            "description" => string_or_null(description(type_def)),
            "specifiedByURL" => match type_def {
                TypeDefinition::Scalar(scalar) => specified_by_url(&scalar.directives)
                    .map_or(Value::Null, |url| Value::String(url.to_string())),
                _ => Value::Null,
            },
            "fields" => {
                let type_fields = match type_def {
                    TypeDefinition::Object(o) => &o.fields,
                    TypeDefinition::Interface(i) => &i.fields,
                    _ => return Value::Null,
                };
                let include_deprecated = self.include_deprecated(group);
                Value::Array(
                    type_fields
                        .iter()
                        .filter(|f| {
                            !f.name.starts_with("__")
                                && (include_deprecated || !is_deprecated(&f.directives))
                        })
                        .map(|f| self.resolve_field(f, group))
                        .collect(),
                )
            }
            "interfaces" => {
                let interfaces = match type_def {
                    TypeDefinition::Object(o) => &o.implements_interfaces,
                    TypeDefinition::Interface(i) => &i.implements_interfaces,
                    _ => return Value::Null,
                };
                Value::Array(
                    interfaces
                        .iter()
                        .filter_map(|name| self.schema.type_by_name(name))
                        .map(|t| self.resolve_type_definition(t, group))
                        .collect(),
                )
            }
            "possibleTypes" => match type_def {
                TypeDefinition::Interface(_) | TypeDefinition::Union(_) => Value::Array(
                    self.schema
                        .possible_types(type_def)
                        .into_iter()
                        .map(|t| self.resolve_type_definition(t, group))
                        .collect(),
                ),
                _ => Value::Null,
            },
            "enumValues" => match type_def {
                TypeDefinition::Enum(enum_type) => {
                    let include_deprecated = self.include_deprecated(group);
                    Value::Array(
                        enum_type
                            .values
                            .iter()
                            .filter(|v| include_deprecated || !is_deprecated(&v.directives))
                            .map(|v| self.resolve_enum_value(v, group))
                            .collect(),
                    )
                }
                _ => Value::Null,
            },
            "inputFields" => match type_def {
                TypeDefinition::InputObject(io) => self.resolve_input_values(&io.fields, group),
                _ => Value::Null,
            },
            "isOneOf" => match type_def {
                TypeDefinition::InputObject(io) => {
                    Value::Bool(io.directives.iter().any(|d| d.name == "oneOf"))
                }
                _ => Value::Null,
            },
            _ => Value::Null,
        })
    }

    fn resolve_wrapper_type(
        &self,
        kind: &'static str,
        inner_type: &Type<'static, String>,
        fields: &[&'exec StaticField],
    ) -> Value {
        self.resolve_object(fields, "__Type", |name, group| match name {
            "kind" => Value::String(kind.to_string()),
            "ofType" => self.resolve_type(inner_type, group),
            _ => Value::Null,
        })
    }

    fn resolve_type(&self, t: &Type<'static, String>, fields: &[&'exec StaticField]) -> Value {
        match t {
            Type::NamedType(name) => self
                .schema
                .type_by_name(name)
                .map_or(Value::Null, |type_def| self.resolve_type_definition(type_def, fields)),
            Type::ListType(inner) => self.resolve_wrapper_type("LIST", inner, fields),
            Type::NonNullType(inner) => self.resolve_wrapper_type("NON_NULL", inner, fields),
        }
    }

    fn resolve_directive(&self, d: &DirectiveDefinition<'static, String>, fields: &[&'exec StaticField]) -> Value {
        self.resolve_object(fields, "__Directive", |name, group| match name {
            "name" => Value::String(d.name.clone()),
            "description" => string_or_null(d.description.as_ref()),
            "locations" => Value::Array(
                d.locations
                    .iter()
                    .map(|l| Value::String(l.as_str().to_string()))
                    .collect(),
            ),
            "args" => self.resolve_input_values(&d.arguments, group),
            "isRepeatable" => Value::Bool(d.repeatable),
            _ => Value::Null,
        })
    }

    fn resolve_named_root(&self, name: Option<&str>, fields: &[&'exec StaticField]) -> Value {
        name.and_then(|name| self.schema.type_by_name(name))
            .map_or(Value::Null, |t| self.resolve_type_definition(t, fields))
    }

    fn resolve_schema(&self, fields: &[&'exec StaticField]) -> Value {
        let roots = self.schema.roots();
        self.resolve_object(fields, "__Schema", |name, group| match name {
            "types" => Value::Array(
                self.schema
                    .types()
                    .map(|t| self.resolve_type_definition(t, group))
                    .collect(),
            ),
            "queryType" => self.resolve_named_root(roots.query.as_deref(), group),
            "mutationType" => self.resolve_named_root(roots.mutation.as_deref(), group),
            "subscriptionType" => self.resolve_named_root(roots.subscription.as_deref(), group),
            "directives" => Value::Array(
                self.schema
                    .directives()
                    .map(|d| self.resolve_directive(d, group))
                    .collect(),
            ),
            _ => Value::Null,
        })
    }

    /// Resolves one root introspection field, grouped by its response key.
    pub fn resolve_root_field(&self, root_type_name: &str, fields: &[&'exec StaticField]) -> Value {
        match fields[0].name.as_str() {
            "__schema" => self.resolve_schema(fields),
            "__type" => argument_value(fields[0], "name", self.variables)
                .as_ref()
                .and_then(Value::as_str)
                .and_then(|name| self.schema.type_by_name(name))
                .map_or(Value::Null, |t| self.resolve_type_definition(t, fields)),
            "__typename" => Value::String(root_type_name.to_string()),
            _ => Value::Null,
        }
    }
}
