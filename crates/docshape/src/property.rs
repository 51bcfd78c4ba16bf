//! Fluent description of a single document property.

use crate::outcome::Outcome;
use crate::predicate::{
    async_converter, async_predicate, async_requiredness, sync_converter, sync_predicate,
    sync_requiredness, BoxMessageFn, BoxRequiredness, Converter, Message, ValidatorDescriptor,
};
use crate::value::is_empty;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Whether a property must carry a non-empty value.
#[derive(Clone)]
pub(crate) enum Requiredness {
    No,
    Yes,
    /// Conditional: the predicate is evaluated against the document at
    /// validate time.
    When(BoxRequiredness),
}

/// Allowed values for a property: a fixed list, or a function of the
/// document producing one. Content is never validated eagerly.
#[derive(Clone)]
pub(crate) enum Options {
    Fixed(Vec<Value>),
    Dynamic(Arc<dyn Fn(&Value) -> Vec<Value> + Send + Sync>),
}

/// Accumulates one property's schema description through chained calls.
///
/// Builders are finalized into immutable [`PropertySchema`]s when the schema
/// is built; nothing is shared mutably across `validate` calls.
pub struct PropertyBuilder {
    pub(crate) type_tag: String,
    pub(crate) requiredness: Requiredness,
    pub(crate) label: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) validators: Vec<ValidatorDescriptor>,
    pub(crate) default_value: Option<Value>,
    pub(crate) converters_before: Vec<Converter>,
    pub(crate) converters_after: Vec<Converter>,
    pub(crate) options: Option<Options>,
}

impl PropertyBuilder {
    /// Start a description for a property of the given type tag. Prefer the
    /// constructors in [`crate::types`].
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            requiredness: Requiredness::No,
            label: None,
            description: None,
            validators: Vec::new(),
            default_value: None,
            converters_before: Vec::new(),
            converters_after: Vec::new(),
            options: None,
        }
    }

    /// Mark the property as required: an empty value fails with `NOT_NULL`.
    pub fn not_null(mut self) -> Self {
        self.requiredness = Requiredness::Yes;
        self
    }

    /// Set requiredness from a flag.
    pub fn not_null_if(mut self, required: bool) -> Self {
        self.requiredness = if required {
            Requiredness::Yes
        } else {
            Requiredness::No
        };
        self
    }

    /// Conditional requiredness: the predicate receives the document at
    /// validate time.
    pub fn not_null_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.requiredness = Requiredness::When(sync_requiredness(predicate));
        self
    }

    /// Conditional requiredness with an asynchronous predicate.
    pub fn not_null_when_async<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.requiredness = Requiredness::When(async_requiredness(predicate));
        self
    }

    /// Display label, used in generated error messages. No validation effect.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Free-form description. Metadata only.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a synchronous validator. The predicate receives the property
    /// value and the document; see [`Outcome`] for the calling convention.
    ///
    /// Returns a [`ValidatorBuilder`] so a following `with_error_code` /
    /// `with_error_message` configures the validator just attached, while
    /// any other call resumes the property chain.
    pub fn valid_if<F, O>(mut self, predicate: F) -> ValidatorBuilder
    where
        F: Fn(&Value, &Value) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.validators
            .push(ValidatorDescriptor::inline(sync_predicate(predicate)));
        ValidatorBuilder { owner: self }
    }

    /// Attach an asynchronous validator. The predicate receives owned clones
    /// of the property value and the document.
    pub fn valid_if_async<F, Fut, O>(mut self, predicate: F) -> ValidatorBuilder
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<Outcome>,
    {
        self.validators
            .push(ValidatorDescriptor::inline(async_predicate(predicate)));
        ValidatorBuilder { owner: self }
    }

    /// Attach a validator by registered name. The name is resolved through
    /// the process-wide registry at validate time, never cached; validating
    /// against an unregistered name is a configuration fault.
    pub fn valid_if_named(mut self, name: impl Into<String>) -> ValidatorBuilder {
        self.validators.push(ValidatorDescriptor::named(name));
        ValidatorBuilder { owner: self }
    }

    /// Default substituted when the document's value is empty, before any
    /// converter or check runs.
    ///
    /// # Panics
    ///
    /// Panics when `value` is itself empty (`null` or an empty string): a
    /// default must carry an actual value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        assert!(
            !is_empty(&value),
            "invalid default value: expected a non-empty value"
        );
        self.default_value = Some(value);
        self
    }

    /// Append a converter run before validation, in attachment order.
    pub fn convert_before<F>(mut self, converter: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.converters_before
            .push(Converter::Inline(sync_converter(converter)));
        self
    }

    /// Append an asynchronous pre-validation converter.
    pub fn convert_before_async<F, Fut>(mut self, converter: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.converters_before
            .push(Converter::Inline(async_converter(converter)));
        self
    }

    /// Append a registered converter by name, resolved at validate time.
    pub fn convert_before_named(mut self, name: impl Into<String>) -> Self {
        self.converters_before.push(Converter::Named(name.into()));
        self
    }

    /// Append a converter run after validation passes, in attachment order.
    pub fn convert_after<F>(mut self, converter: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.converters_after
            .push(Converter::Inline(sync_converter(converter)));
        self
    }

    /// Append an asynchronous post-validation converter.
    pub fn convert_after_async<F, Fut>(mut self, converter: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.converters_after
            .push(Converter::Inline(async_converter(converter)));
        self
    }

    /// Append a registered post-validation converter by name.
    pub fn convert_after_named(mut self, name: impl Into<String>) -> Self {
        self.converters_after.push(Converter::Named(name.into()));
        self
    }

    /// Fixed allow-list of values. Enforced at validate time with code
    /// `INVALID_OPTION`.
    pub fn options<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = Some(Options::Fixed(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Allow-list produced from the document at validate time.
    pub fn options_with<F>(mut self, producer: F) -> Self
    where
        F: Fn(&Value) -> Vec<Value> + Send + Sync + 'static,
    {
        self.options = Some(Options::Dynamic(Arc::new(producer)));
        self
    }

    pub(crate) fn into_schema(self, name: String) -> PropertySchema {
        let mut validators = self.validators;
        for descriptor in &mut validators {
            descriptor.property = Some(name.clone());
        }
        PropertySchema {
            name,
            type_tag: self.type_tag,
            requiredness: self.requiredness,
            label: self.label,
            description: self.description,
            validators,
            default_value: self.default_value,
            converters_before: self.converters_before,
            converters_after: self.converters_after,
            options: self.options,
        }
    }
}

/// Configures the validator just attached by a `valid_if*` call, and forwards
/// everything else back to the owning [`PropertyBuilder`] so the original
/// chain reads on naturally:
///
/// ```rust,ignore
/// string()
///     .valid_if(|v, _| *v != "vancouver")
///     .with_error_code("INVALID_NAME")
///     .valid_if(|v, _| *v != "toronto")
///     .with_error_message("no toronto either")
/// ```
pub struct ValidatorBuilder {
    owner: PropertyBuilder,
}

impl ValidatorBuilder {
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
    /// convention. A string-returning predicate overrides it.
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

    /// Attach a further validator to the same property.
    pub fn valid_if<F, O>(self, predicate: F) -> ValidatorBuilder
    where
        F: Fn(&Value, &Value) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.owner.valid_if(predicate)
    }

    /// Attach a further asynchronous validator.
    pub fn valid_if_async<F, Fut, O>(self, predicate: F) -> ValidatorBuilder
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<Outcome>,
    {
        self.owner.valid_if_async(predicate)
    }

    /// Attach a further registered validator by name.
    pub fn valid_if_named(self, name: impl Into<String>) -> ValidatorBuilder {
        self.owner.valid_if_named(name)
    }

    /// Resume the property chain: see [`PropertyBuilder::not_null`].
    pub fn not_null(self) -> PropertyBuilder {
        self.owner.not_null()
    }

    /// See [`PropertyBuilder::not_null_if`].
    pub fn not_null_if(self, required: bool) -> PropertyBuilder {
        self.owner.not_null_if(required)
    }

    /// See [`PropertyBuilder::not_null_when`].
    pub fn not_null_when<F>(self, predicate: F) -> PropertyBuilder
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.owner.not_null_when(predicate)
    }

    /// See [`PropertyBuilder::label`].
    pub fn label(self, label: impl Into<String>) -> PropertyBuilder {
        self.owner.label(label)
    }

    /// See [`PropertyBuilder::description`].
    pub fn description(self, description: impl Into<String>) -> PropertyBuilder {
        self.owner.description(description)
    }

    /// See [`PropertyBuilder::default_value`].
    pub fn default_value(self, value: impl Into<Value>) -> PropertyBuilder {
        self.owner.default_value(value)
    }

    /// See [`PropertyBuilder::convert_before`].
    pub fn convert_before<F>(self, converter: F) -> PropertyBuilder
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.owner.convert_before(converter)
    }

    /// See [`PropertyBuilder::convert_after`].
    pub fn convert_after<F>(self, converter: F) -> PropertyBuilder
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.owner.convert_after(converter)
    }

    /// See [`PropertyBuilder::options`].
    pub fn options<I, V>(self, values: I) -> PropertyBuilder
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.owner.options(values)
    }
}

impl From<ValidatorBuilder> for PropertyBuilder {
    fn from(builder: ValidatorBuilder) -> Self {
        builder.owner
    }
}

/// One property's finalized, immutable description.
pub(crate) struct PropertySchema {
    pub(crate) name: String,
    pub(crate) type_tag: String,
    pub(crate) requiredness: Requiredness,
    pub(crate) label: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) validators: Vec<ValidatorDescriptor>,
    pub(crate) default_value: Option<Value>,
    pub(crate) converters_before: Vec<Converter>,
    pub(crate) converters_after: Vec<Converter>,
    pub(crate) options: Option<Options>,
}

impl PropertySchema {
    /// Name used in generated messages: the label when set, else the
    /// property name.
    pub(crate) fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for PropertySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySchema")
            .field("name", &self.name)
            .field("type", &self.type_tag)
            .field("label", &self.label)
            .field("description", &self.description)
            .field("required", &!matches!(self.requiredness, Requiredness::No))
            .field("validators", &self.validators.len())
            .field("default_value", &self.default_value)
            .field("converters_before", &self.converters_before.len())
            .field("converters_after", &self.converters_after.len())
            .field("has_options", &self.options.is_some())
            .finish()
    }
}
