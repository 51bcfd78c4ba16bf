//! Boxed async function types and the inline-vs-named tagged unions.
//!
//! Every predicate and converter is stored as a boxed future-returning
//! function, so synchronous and asynchronous callables share one shape and
//! the pipeline stays uniformly asynchronous. Synchronous closures are
//! wrapped into ready futures at attach time.

use crate::outcome::Outcome;
use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// A validator predicate: `(value, document) -> Outcome`, asynchronously.
///
/// Property-level predicates receive the property value and the document;
/// schema-level predicates receive the document in both positions.
pub(crate) type BoxPredicate =
    Arc<dyn for<'a> Fn(&'a Value, &'a Value) -> BoxFuture<'a, Outcome> + Send + Sync>;

/// A converter: transforms a property value, asynchronously.
pub(crate) type BoxConverter = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

/// A requiredness predicate evaluated against the whole document.
pub(crate) type BoxRequiredness =
    Arc<dyn for<'a> Fn(&'a Value) -> BoxFuture<'a, bool> + Send + Sync>;

/// An error-message resolver, invoked lazily with the document.
pub(crate) type BoxMessageFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Wrap a synchronous predicate into the uniform async shape.
pub(crate) fn sync_predicate<F, O>(predicate: F) -> BoxPredicate
where
    F: Fn(&Value, &Value) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Arc::new(move |value, document| future::ready(predicate(value, document).into()).boxed())
}

/// Wrap an asynchronous predicate. The predicate receives owned clones so its
/// future does not borrow from the pipeline.
pub(crate) fn async_predicate<F, Fut, O>(predicate: F) -> BoxPredicate
where
    F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = O> + Send + 'static,
    O: Into<Outcome>,
{
    Arc::new(move |value, document| {
        let fut = predicate(value.clone(), document.clone());
        async move { fut.await.into() }.boxed()
    })
}

/// Wrap a synchronous converter.
pub(crate) fn sync_converter<F>(converter: F) -> BoxConverter
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Arc::new(move |value| future::ready(converter(value)).boxed())
}

/// Wrap an asynchronous converter.
pub(crate) fn async_converter<F, Fut>(converter: F) -> BoxConverter
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Value> + Send + 'static,
{
    Arc::new(move |value| converter(value).boxed())
}

/// Wrap a synchronous requiredness predicate.
pub(crate) fn sync_requiredness<F>(predicate: F) -> BoxRequiredness
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(move |document| future::ready(predicate(document)).boxed())
}

/// Wrap an asynchronous requiredness predicate.
pub(crate) fn async_requiredness<F, Fut>(predicate: F) -> BoxRequiredness
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    Arc::new(move |document| predicate(document.clone()).boxed())
}

/// A validator's predicate: inline, or a name resolved through the registry
/// at validate time. Named references are never cached at attach time, so
/// unregistering a validator changes the outcome of later validations.
#[derive(Clone)]
pub(crate) enum Predicate {
    Inline(BoxPredicate),
    Named(String),
}

/// A converter reference: inline function or registered name.
#[derive(Clone)]
pub(crate) enum Converter {
    Inline(BoxConverter),
    Named(String),
}

/// A configured error message: fixed text, or a resolver invoked only when
/// the validator actually fails.
#[derive(Clone)]
pub(crate) enum Message {
    Text(String),
    Resolver(BoxMessageFn),
}

impl Message {
    pub(crate) fn resolve(&self, document: &Value) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Resolver(resolver) => (**resolver)(document),
        }
    }
}

/// One attached validator: predicate plus its failure configuration.
#[derive(Clone)]
pub(crate) struct ValidatorDescriptor {
    pub(crate) predicate: Predicate,
    pub(crate) error_code: Option<String>,
    pub(crate) error_message: Option<Message>,
    /// Name of the owning property; `None` for schema-level validators.
    pub(crate) property: Option<String>,
}

impl ValidatorDescriptor {
    pub(crate) fn inline(predicate: BoxPredicate) -> Self {
        Self {
            predicate: Predicate::Inline(predicate),
            error_code: None,
            error_message: None,
            property: None,
        }
    }

    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self {
            predicate: Predicate::Named(name.into()),
            error_code: None,
            error_message: None,
            property: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn sync_predicate_is_awaitable() {
        let pred = sync_predicate(|value: &Value, _: &Value| *value != "bad");
        let doc = json!({});
        assert_eq!((*pred)(&json!("ok"), &doc).await, Outcome::Valid);
        assert_eq!((*pred)(&json!("bad"), &doc).await, Outcome::Invalid);
    }

    #[tokio::test]
    async fn async_predicate_receives_owned_clones() {
        let pred = async_predicate(|value: Value, document: Value| async move {
            value == document["limit"]
        });
        let doc = json!({ "limit": 5 });
        assert_eq!((*pred)(&json!(5), &doc).await, Outcome::Valid);
        assert_eq!((*pred)(&json!(6), &doc).await, Outcome::Invalid);
    }

    #[tokio::test]
    async fn converters_transform_values() {
        let upper = sync_converter(|value: Value| match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        });
        assert_eq!((*upper)(json!("rio")).await, json!("RIO"));
    }

    #[test]
    fn message_resolver_is_invoked_with_document() {
        let message = Message::Resolver(Arc::new(|doc: &Value| {
            format!("bad value for {}", doc["field"].as_str().unwrap_or("?"))
        }));
        assert_eq!(
            message.resolve(&json!({ "field": "name" })),
            "bad value for name"
        );

        let message = Message::Text("fixed".into());
        assert_eq!(message.resolve(&json!({})), "fixed");
    }
}
