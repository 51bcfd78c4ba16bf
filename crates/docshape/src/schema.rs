//! Schema assembly: properties plus whole-document validators.

use crate::engine;
use crate::error::SchemaError;
use crate::outcome::Outcome;
use crate::predicate::{
    async_predicate, sync_predicate, BoxMessageFn, Message, ValidatorDescriptor,
};
use crate::property::{PropertyBuilder, PropertySchema};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Accumulates a schema: an ordered property map plus schema-level
/// validators. Finalized into an immutable [`Schema`] by [`build`].
///
/// [`build`]: SchemaBuilder::build
pub struct SchemaBuilder {
    properties: Vec<(String, PropertyBuilder)>,
    pub(crate) validators: Vec<ValidatorDescriptor>,
}

impl SchemaBuilder {
    /// Attach a whole-document validator. The predicate receives the
    /// (converted) document; see [`Outcome`] for the calling convention.
    pub fn valid_if<F, O>(mut self, predicate: F) -> SchemaValidatorBuilder
    where
        F: Fn(&Value) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.validators.push(ValidatorDescriptor::inline(
            sync_predicate(move |_, document| predicate(document)),
        ));
        SchemaValidatorBuilder { owner: self }
    }

    /// Attach an asynchronous whole-document validator.
    pub fn valid_if_async<F, Fut, O>(mut self, predicate: F) -> SchemaValidatorBuilder
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<Outcome>,
    {
        self.validators.push(ValidatorDescriptor::inline(
            async_predicate(move |_, document| predicate(document)),
        ));
        SchemaValidatorBuilder { owner: self }
    }

    /// Attach a registered whole-document validator by name, resolved at
    /// validate time.
    pub fn valid_if_named(mut self, name: impl Into<String>) -> SchemaValidatorBuilder {
        self.validators.push(ValidatorDescriptor::named(name));
        SchemaValidatorBuilder { owner: self }
    }

    /// Finalize into an immutable [`Schema`].
    ///
    /// Property names are unique: a later entry under an existing name
    /// replaces the earlier one, keeping its original position.
    pub fn build(self) -> Schema {
        let mut properties: Vec<PropertySchema> = Vec::with_capacity(self.properties.len());
        for (name, builder) in self.properties {
            let schema = builder.into_schema(name);
            match properties.iter_mut().find(|p| p.name == schema.name) {
                Some(slot) => *slot = schema,
                None => properties.push(schema),
            }
        }
        Schema {
            properties,
            validators: self.validators,
        }
    }
}

/// Configures the schema-level validator just attached, and forwards the
/// rest of the chain back to the owning [`SchemaBuilder`]. Same semantics as
/// [`crate::ValidatorBuilder`], at document scope.
pub struct SchemaValidatorBuilder {
    owner: SchemaBuilder,
}

impl SchemaValidatorBuilder {
    fn configure(mut self, f: impl FnOnce(&mut ValidatorDescriptor)) -> Self {
        if let Some(descriptor) = self.owner.validators.last_mut() {
            f(descriptor);
        }
        self
    }

    /// Error code reported when this validator fails. Defaults to `INVALID`.
    pub fn with_error_code(self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.configure(|d| d.error_code = Some(code))
    }

    /// Error message reported when this validator fails via the boolean
    /// convention.
    pub fn with_error_message(self, message: impl Into<String>) -> Self {
        let message = Message::Text(message.into());
        self.configure(|d| d.error_message = Some(message))
    }

    /// Lazy message resolver, invoked with the document only on failure.
    pub fn with_error_message_fn<F>(self, resolver: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        let resolver: BoxMessageFn = Arc::new(resolver);
        self.configure(|d| d.error_message = Some(Message::Resolver(resolver)))
    }

    /// Attach a further schema-level validator.
    pub fn valid_if<F, O>(self, predicate: F) -> SchemaValidatorBuilder
    where
        F: Fn(&Value) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.owner.valid_if(predicate)
    }

    /// Attach a further asynchronous schema-level validator.
    pub fn valid_if_async<F, Fut, O>(self, predicate: F) -> SchemaValidatorBuilder
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<Outcome>,
    {
        self.owner.valid_if_async(predicate)
    }

    /// Attach a further registered schema-level validator by name.
    pub fn valid_if_named(self, name: impl Into<String>) -> SchemaValidatorBuilder {
        self.owner.valid_if_named(name)
    }

    /// Finalize into an immutable [`Schema`].
    pub fn build(self) -> Schema {
        self.owner.build()
    }
}

impl From<SchemaValidatorBuilder> for SchemaBuilder {
    fn from(builder: SchemaValidatorBuilder) -> Self {
        builder.owner
    }
}

/// An assembled, immutable document schema.
///
/// Built once via [`Schema::create`]; `validate` never mutates it, so one
/// schema can serve any number of concurrent validations.
pub struct Schema {
    pub(crate) properties: Vec<PropertySchema>,
    pub(crate) validators: Vec<ValidatorDescriptor>,
}

impl Schema {
    /// Start a schema from an ordered collection of `(name, property)`
    /// pairs. Property iteration order is insertion order.
    ///
    /// Values may be [`PropertyBuilder`]s or the validator-chain handles they
    /// produce; chains ending in `with_error_code` / `with_error_message`
    /// drop in via `.into()`.
    pub fn create<I, N, P>(properties: I) -> SchemaBuilder
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<PropertyBuilder>,
    {
        SchemaBuilder {
            properties: properties
                .into_iter()
                .map(|(name, builder)| (name.into(), builder.into()))
                .collect(),
            validators: Vec::new(),
        }
    }

    /// Validate a document against this schema.
    ///
    /// Fulfills with the converted document, or rejects with
    /// [`SchemaError::Validation`] (ordered failure list) or
    /// [`SchemaError::Config`] (schema misconfiguration). The contract is
    /// asynchronous even for purely synchronous schemas.
    pub async fn validate(&self, document: Value) -> Result<Value, SchemaError> {
        engine::run(self, document).await
    }

    /// Property names in iteration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("properties", &self.properties)
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{number, string};

    #[test]
    fn insertion_order_is_preserved() {
        let schema = Schema::create([
            ("zulu", string()),
            ("alpha", string()),
            ("mike", number()),
        ])
        .build();

        let names: Vec<_> = schema.property_names().collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn duplicate_names_replace_in_place() {
        let schema = Schema::create([
            ("name", string()),
            ("age", number()),
            ("name", string().not_null()),
        ])
        .build();

        let names: Vec<_> = schema.property_names().collect();
        assert_eq!(names, vec!["name", "age"]);
        // the replacement carried the notNull flag
        assert!(matches!(
            schema.properties[0].requiredness,
            crate::property::Requiredness::Yes
        ));
    }

    #[test]
    fn schema_level_validators_have_no_owner_property() {
        let schema = Schema::create([("name", string())])
            .valid_if(|_: &Value| true)
            .with_error_code("X")
            .build();

        assert_eq!(schema.validators.len(), 1);
        assert!(schema.validators[0].property.is_none());
        assert_eq!(schema.validators[0].error_code.as_deref(), Some("X"));
    }
}
