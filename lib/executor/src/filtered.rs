use std::sync::Arc;

use futures::{stream, StreamExt};
use gateway_schema_filter::{
    Exposure, FilterRules, FilteredDocument, OperationKind, SchemaDocument, SchemaFilter,
};
use graphql_tools::validation::{
    rules::default_rules_validation_plan, validate::validate, validate::ValidationPlan,
};
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::{
    error::{FilteredSchemaError, OperationError},
    executors::common::{ExecutionStream, SchemaExecutor},
    introspection::{
        partition::{downstream_operation, has_introspection_root_fields, is_introspection_field_name},
        resolve::IntrospectionContext,
        schema::IntrospectionSchema,
    },
    operation::{
        collect_fields, fragments, operations, parse_operation, resolve_operation,
        variable_values, QueryDocument,
    },
    request::ExecutionRequest,
    response::{execution_result::ExecutionResult, graphql_error::GraphQLError},
    source::SourceSchema,
};

/// An operation that parsed and validated against the filtered schema.
#[derive(Debug)]
pub struct PreparedOperation {
    pub request: ExecutionRequest,
    pub document: QueryDocument,
    pub kind: OperationKind,
}

/// A source schema seen through a set of visibility rules.
///
/// Operations are checked against the filtered view and, once accepted, run
/// unchanged against the source. Introspection is answered from the filtered
/// view so hidden fields never leak.
pub struct FilteredSchema {
    source: Arc<SourceSchema>,
    filtered: FilteredDocument,
    introspection: IntrospectionSchema,
    validation_plan: ValidationPlan,
}

impl FilteredSchema {
    pub fn new(source: Arc<SourceSchema>, rules: &FilterRules) -> Result<Self, FilteredSchemaError> {
        let filtered = SchemaFilter::apply(&source.document, rules)?;
        let introspection = IntrospectionSchema::new(&filtered.document)?;
        debug!(
            "filtered schema ready, query fields: [{}]",
            filtered.exposure.query.join(", ")
        );

        Ok(FilteredSchema {
            source,
            filtered,
            introspection,
            validation_plan: default_rules_validation_plan(),
        })
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.filtered.document
    }

    pub fn exposure(&self) -> &Exposure {
        &self.filtered.exposure
    }

    pub fn source(&self) -> &Arc<SourceSchema> {
        &self.source
    }

    pub fn sdl(&self) -> String {
        self.filtered.document.to_string()
    }

    pub fn supports(&self, kind: OperationKind) -> bool {
        self.introspection.roots().get(kind).is_some()
    }

    /// Parses and validates a request against the filtered schema.
    #[instrument(level = "debug", skip_all, name = "prepare_operation")]
    pub fn prepare(&self, request: ExecutionRequest) -> Result<PreparedOperation, OperationError> {
        let document =
            parse_operation(&request.query).map_err(|e| OperationError::Parse(e.to_string()))?;

        // validating against a missing root type would report misleading field errors
        if let Some(unsupported) = operations(&document)
            .map(|operation| operation.kind)
            .find(|kind| !self.supports(*kind))
        {
            return Err(OperationError::UnsupportedOperation(unsupported));
        }

        let errors = validate(
            self.introspection.document(),
            &document,
            &self.validation_plan,
        );
        if !errors.is_empty() {
            debug!("operation failed validation with {} errors", errors.len());
            trace!("validation errors: {:?}", errors);
            return Err(OperationError::Validation(errors));
        }

        let kind = resolve_operation(&document, request.operation_name.as_deref())?.kind;

        Ok(PreparedOperation {
            request,
            document,
            kind,
        })
    }

    /// Runs a query or mutation; every failure is reported inside the result.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        match self.prepare(request) {
            Ok(prepared) => self.execute_prepared(prepared).await,
            Err(error) => ExecutionResult::new(None, Some(error.graphql_errors()), None),
        }
    }

    #[instrument(level = "debug", skip_all, name = "execute_operation", fields(kind = prepared.kind.as_str()))]
    pub async fn execute_prepared(&self, prepared: PreparedOperation) -> ExecutionResult {
        let PreparedOperation {
            request, document, ..
        } = prepared;

        let operation = match resolve_operation(&document, request.operation_name.as_deref()) {
            Ok(operation) => operation,
            Err(error) => return ExecutionResult::new(None, Some(error.graphql_errors()), None),
        };
        let fragments = fragments(&document);

        if !has_introspection_root_fields(operation.selection_set, &fragments) {
            return self.delegate(request).await;
        }

        let root_type_name = self
            .introspection
            .roots()
            .get(operation.kind)
            .unwrap_or(operation.kind.as_str());
        let variables = variable_values(&operation, request.variables.as_ref());
        let root_fields = collect_fields(operation.selection_set, root_type_name, &fragments, &variables);

        let downstream = match downstream_operation(&document, &operation, &fragments) {
            Some(downstream_document) => {
                trace!("delegating the non-introspection part of the operation");
                let downstream_request = ExecutionRequest {
                    query: downstream_document.to_string(),
                    ..request.clone()
                };
                Some(self.delegate(downstream_request).await)
            }
            None => None,
        };

        let ctx = IntrospectionContext {
            schema: &self.introspection,
            fragments: &fragments,
            variables: &variables,
        };

        let (mut downstream_data, errors, extensions) = match downstream {
            Some(result) => match result.data {
                Some(Value::Object(data)) => (Some(data), result.errors, result.extensions),
                // a null downstream result nulls the whole response
                _ => return ExecutionResult::new(None, result.errors, result.extensions),
            },
            None => (None, None, None),
        };

        let mut data = Map::with_capacity(root_fields.len());
        for (key, fields) in root_fields {
            let value = if is_introspection_field_name(&fields[0].name) {
                ctx.resolve_root_field(root_type_name, &fields)
            } else {
                downstream_data
                    .as_mut()
                    .and_then(|downstream| downstream.remove(key))
                    .unwrap_or(Value::Null)
            };
            data.insert(key.to_string(), value);
        }

        ExecutionResult::new(Some(Value::Object(data)), errors, extensions)
    }

    /// Subscribes to the source schema; the stream carries every event unchanged.
    #[instrument(level = "debug", skip_all, name = "subscribe_operation")]
    pub async fn subscribe(&self, prepared: PreparedOperation) -> ExecutionStream {
        match self.source.executor.subscribe(prepared.request).await {
            Ok(stream) => stream,
            Err(error) => stream::once(async move {
                ExecutionResult::from_error(GraphQLError::from(error))
            })
            .boxed(),
        }
    }

    async fn delegate(&self, request: ExecutionRequest) -> ExecutionResult {
        match self.source.executor.execute(request).await {
            Ok(result) => result,
            Err(error) => ExecutionResult::from_error(error.into()),
        }
    }
}
