//! The asynchronous validate pipeline.
//!
//! Property pipelines are independent and run concurrently; within one
//! property, converters and validators run strictly in attachment order,
//! each step awaited before the next. The assembled error list follows
//! schema insertion order regardless of completion order. Schema-level
//! validators run only when every property pipeline produced zero errors.

use crate::error::{codes, ConfigError, SchemaError, ValidationError};
use crate::outcome::Outcome;
use crate::predicate::{BoxPredicate, Converter, Predicate, ValidatorDescriptor};
use crate::property::{Options, PropertySchema, Requiredness};
use crate::registry::{converters, validators, ValidatorEntry};
use crate::schema::Schema;
use crate::value::{is_empty, type_name};
use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, trace};

pub(crate) async fn run(schema: &Schema, document: Value) -> Result<Value, SchemaError> {
    let map = match document {
        Value::Object(map) => map,
        other => return Err(ConfigError::DocumentNotObject(type_name(&other)).into()),
    };
    let mut output = map.clone();
    let document = Value::Object(map);

    trace!(properties = schema.properties.len(), "validating document");

    let results = join_all(
        schema
            .properties
            .iter()
            .map(|property| run_property(property, &document)),
    )
    .await;

    let mut errors = Vec::new();
    for (property, result) in schema.properties.iter().zip(results) {
        match result? {
            Ok(value) => {
                // write back the converted value; do not invent keys for
                // properties the document never had and nothing filled in
                if output.contains_key(&property.name) || !value.is_null() {
                    output.insert(property.name.clone(), value);
                }
            }
            Err(error) => {
                debug!(
                    property = %property.name,
                    code = %error.code,
                    "property validation failed"
                );
                errors.push(error);
            }
        }
    }

    if !errors.is_empty() {
        return Err(SchemaError::Validation(errors));
    }

    let output = Value::Object(output);
    for descriptor in &schema.validators {
        let (predicate, entry) = resolve_predicate(descriptor)?;
        let outcome = (*predicate)(&output, &output).await;
        if let Some(error) = failure_for(outcome, descriptor, entry.as_ref(), &output) {
            debug!(code = %error.code, "schema-level validation failed");
            return Err(SchemaError::Validation(vec![error]));
        }
    }

    Ok(output)
}

/// One property's pipeline: default, pre-converters, requiredness, options,
/// validators, post-converters. Produces the converted value or at most one
/// validation error; configuration faults abort the whole validate call.
async fn run_property(
    property: &PropertySchema,
    document: &Value,
) -> Result<Result<Value, ValidationError>, ConfigError> {
    let mut value = document.get(&property.name).cloned().unwrap_or(Value::Null);

    if is_empty(&value) {
        if let Some(default) = &property.default_value {
            value = default.clone();
        }
    }

    for converter in &property.converters_before {
        value = apply_converter(converter, value).await?;
    }

    let required = match &property.requiredness {
        Requiredness::No => false,
        Requiredness::Yes => true,
        Requiredness::When(predicate) => (**predicate)(document).await,
    };
    if required && is_empty(&value) {
        return Ok(Err(ValidationError::new(
            Some(property.name.clone()),
            codes::NOT_NULL,
            format!("{} is required", property.display_name()),
        )));
    }

    if !is_empty(&value) {
        if let Some(options) = &property.options {
            let allowed = match options {
                Options::Fixed(values) => values.contains(&value),
                Options::Dynamic(producer) => (**producer)(document).contains(&value),
            };
            if !allowed {
                return Ok(Err(ValidationError::new(
                    Some(property.name.clone()),
                    codes::INVALID_OPTION,
                    format!("{} is not one of the allowed values", property.display_name()),
                )));
            }
        }
    }

    for descriptor in &property.validators {
        let (predicate, entry) = resolve_predicate(descriptor)?;
        let outcome = (*predicate)(&value, document).await;
        if let Some(error) = failure_for(outcome, descriptor, entry.as_ref(), document) {
            return Ok(Err(error));
        }
    }

    for converter in &property.converters_after {
        value = apply_converter(converter, value).await?;
    }

    Ok(Ok(value))
}

async fn apply_converter(converter: &Converter, value: Value) -> Result<Value, ConfigError> {
    match converter {
        Converter::Inline(converter) => Ok((**converter)(value).await),
        Converter::Named(name) => {
            let converter = converters()
                .get(name)
                .ok_or_else(|| ConfigError::UnknownConverter(name.clone()))?;
            Ok((*converter)(value).await)
        }
    }
}

/// Resolve a descriptor's predicate, looking named validators up in the
/// registry now, at validate time.
fn resolve_predicate(
    descriptor: &ValidatorDescriptor,
) -> Result<(BoxPredicate, Option<ValidatorEntry>), ConfigError> {
    match &descriptor.predicate {
        Predicate::Inline(predicate) => Ok((predicate.clone(), None)),
        Predicate::Named(name) => {
            let entry = validators()
                .get(name)
                .ok_or_else(|| ConfigError::UnknownValidator(name.clone()))?;
            let predicate = entry.predicate.clone();
            Ok((predicate, Some(entry)))
        }
    }
}

/// Turn an INVALID outcome into a `ValidationError`, resolving code and
/// message: a predicate-supplied message wins, then the descriptor's
/// configuration, then the registry entry's defaults, then `INVALID` with a
/// generic message.
fn failure_for(
    outcome: Outcome,
    descriptor: &ValidatorDescriptor,
    entry: Option<&ValidatorEntry>,
    document: &Value,
) -> Option<ValidationError> {
    let code = || {
        descriptor
            .error_code
            .clone()
            .or_else(|| entry.and_then(|e| e.error_code.clone()))
            .unwrap_or_else(|| codes::INVALID.to_string())
    };

    match outcome {
        Outcome::Valid => None,
        Outcome::Message(message) => Some(ValidationError::new(
            descriptor.property.clone(),
            code(),
            message,
        )),
        Outcome::Invalid => {
            let message = descriptor
                .error_message
                .as_ref()
                .or_else(|| entry.and_then(|e| e.error_message.as_ref()))
                .map(|message| message.resolve(document))
                .unwrap_or_else(|| "Invalid value".to_string());
            Some(ValidationError::new(
                descriptor.property.clone(),
                code(),
                message,
            ))
        }
    }
}
