//! Process-wide registries of reusable named validators and converters.
//!
//! Both registries key entries case-insensitively (names are lower-cased on
//! insert and lookup) and follow last-writer-wins on re-registration. They
//! are shared mutable state: register/unregister are expected to happen
//! outside of in-flight `validate` calls that depend on the entries being
//! mutated. Interior locking keeps concurrent access memory-safe, nothing
//! more.

use crate::outcome::Outcome;
use crate::predicate::{
    async_converter, async_predicate, sync_converter, sync_predicate, BoxConverter, BoxMessageFn,
    BoxPredicate, Message,
};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock, RwLock};

const LOCK_POISONED: &str = "registry lock poisoned";

/// The process-wide validator registry.
pub fn validators() -> &'static ValidatorRegistry {
    static REGISTRY: OnceLock<ValidatorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ValidatorRegistry::new)
}

/// The process-wide converter registry.
pub fn converters() -> &'static ConverterRegistry {
    static REGISTRY: OnceLock<ConverterRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ConverterRegistry::new)
}

/// A stored named validator: predicate plus default failure configuration.
///
/// The defaults apply when the predicate fails via the boolean calling
/// convention and the attaching schema configured nothing more specific.
#[derive(Clone)]
pub struct ValidatorEntry {
    pub(crate) predicate: BoxPredicate,
    pub(crate) error_code: Option<String>,
    pub(crate) error_message: Option<Message>,
}

impl ValidatorEntry {
    /// The default error code configured at registration, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }
}

/// Store of reusable named validators.
pub struct ValidatorRegistry {
    entries: RwLock<HashMap<String, ValidatorEntry>>,
}

impl ValidatorRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a synchronous validator under `name` (case-insensitive).
    ///
    /// Re-registering an existing name overwrites it. Returns a handle for
    /// chaining default code/message configuration onto the entry.
    pub fn register<F, O>(&self, name: &str, predicate: F) -> Registration<'_>
    where
        F: Fn(&Value, &Value) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.insert(name, sync_predicate(predicate))
    }

    /// Register an asynchronous validator under `name` (case-insensitive).
    pub fn register_async<F, Fut, O>(&self, name: &str, predicate: F) -> Registration<'_>
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<Outcome>,
    {
        self.insert(name, async_predicate(predicate))
    }

    fn insert(&self, name: &str, predicate: BoxPredicate) -> Registration<'_> {
        let key = name.to_lowercase();
        self.entries.write().expect(LOCK_POISONED).insert(
            key.clone(),
            ValidatorEntry {
                predicate,
                error_code: None,
                error_message: None,
            },
        );
        Registration {
            registry: self,
            key,
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<ValidatorEntry> {
        self.entries
            .read()
            .expect(LOCK_POISONED)
            .get(&name.to_lowercase())
            .cloned()
    }

    /// Case-insensitive removal; absent names are ignored.
    pub fn unregister(&self, name: &str) {
        self.entries
            .write()
            .expect(LOCK_POISONED)
            .remove(&name.to_lowercase());
    }

    /// Remove every entry. Intended for test teardown.
    pub fn clear(&self) {
        self.entries.write().expect(LOCK_POISONED).clear();
    }

    fn update(&self, key: &str, f: impl FnOnce(&mut ValidatorEntry)) {
        if let Some(entry) = self.entries.write().expect(LOCK_POISONED).get_mut(key) {
            f(entry);
        }
    }
}

/// Chainable handle returned by [`ValidatorRegistry::register`].
///
/// Configures the default code/message of the just-registered entry, used
/// whenever the validator fails through the boolean calling convention.
pub struct Registration<'r> {
    registry: &'r ValidatorRegistry,
    key: String,
}

impl Registration<'_> {
    /// Set the entry's default error code.
    pub fn with_error_code(self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.registry
            .update(&self.key, |entry| entry.error_code = Some(code));
        self
    }

    /// Set the entry's default error message.
    pub fn with_error_message(self, message: impl Into<String>) -> Self {
        let message = Message::Text(message.into());
        self.registry
            .update(&self.key, |entry| entry.error_message = Some(message));
        self
    }

    /// Set a lazy message resolver, invoked with the document only when the
    /// validator fails.
    pub fn with_error_message_fn<F>(self, resolver: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        let resolver: BoxMessageFn = Arc::new(resolver);
        self.registry.update(&self.key, |entry| {
            entry.error_message = Some(Message::Resolver(resolver))
        });
        self
    }
}

/// Store of reusable named converters.
pub struct ConverterRegistry {
    entries: RwLock<HashMap<String, BoxConverter>>,
}

impl ConverterRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a synchronous converter under `name` (case-insensitive,
    /// last writer wins).
    pub fn register<F>(&self, name: &str, converter: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.insert(name, sync_converter(converter));
    }

    /// Register an asynchronous converter.
    pub fn register_async<F, Fut>(&self, name: &str, converter: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.insert(name, async_converter(converter));
    }

    fn insert(&self, name: &str, converter: BoxConverter) {
        self.entries
            .write()
            .expect(LOCK_POISONED)
            .insert(name.to_lowercase(), converter);
    }

    pub(crate) fn get(&self, name: &str) -> Option<BoxConverter> {
        self.entries
            .read()
            .expect(LOCK_POISONED)
            .get(&name.to_lowercase())
            .cloned()
    }

    /// Whether a converter is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries
            .read()
            .expect(LOCK_POISONED)
            .contains_key(&name.to_lowercase())
    }

    /// Case-insensitive removal; absent names are ignored.
    pub fn unregister(&self, name: &str) {
        self.entries
            .write()
            .expect(LOCK_POISONED)
            .remove(&name.to_lowercase());
    }

    /// Remove every entry. Intended for test teardown.
    pub fn clear(&self) {
        self.entries.write().expect(LOCK_POISONED).clear();
    }
}
