//! # docshape
//!
//! Declarative schema definition and asynchronous validation for JSON
//! documents. A schema describes each property's expected shape (type tag,
//! requiredness, default, allowed values, converters) and binds ordered
//! chains of predicate validators to properties and to the whole document.
//! `validate` walks a candidate document against the schema and fulfills
//! with the converted document or rejects with an ordered list of failures.
//!
//! ## Example
//!
//! ```rust,ignore
//! use docshape::prelude::*;
//! use serde_json::json;
//!
//! let schema = Schema::create([(
//!     "name",
//!     string()
//!         .not_null()
//!         .valid_if(|v, _| *v != "vancouver")
//!         .with_error_code("INVALID_NAME"),
//! )])
//! .build();
//!
//! schema.validate(json!({ "name": "rio" })).await?;           // ok
//! schema.validate(json!({ "name": "vancouver" })).await;      // rejects
//! ```
//!
//! ## Validator calling convention
//!
//! Predicates may return `bool` (valid/invalid), a `String`/`&str`/`Some(..)`
//! (invalid, carrying its own message), or `()`/`None` (valid); see
//! [`Outcome`]. Synchronous and asynchronous predicates share one pipeline:
//! the contract is always "eventually resolves or rejects", even for purely
//! synchronous schemas.
//!
//! ## Failure channels
//!
//! Data failures reject with [`SchemaError::Validation`]: an ordered list of
//! `{ property, code, message }`, at most one per property, plus at most one
//! document-level entry when every property passed. Schema misconfiguration
//! (an unresolved registered name, a non-object document) rejects with
//! [`SchemaError::Config`] instead, so the two are distinguishable by shape.
//!
//! ## Registries
//!
//! [`validators()`] and [`converters()`] are process-wide, case-insensitive
//! stores of reusable named validators and converters. Names attached to a
//! schema resolve at validate time, never at build time: unregistering an
//! entry changes the outcome of later validations against existing schemas.

mod engine;
mod error;
mod outcome;
mod predicate;
mod property;
mod registry;
mod schema;
pub mod types;
mod value;

pub use error::{codes, ConfigError, SchemaError, ValidationError};
pub use outcome::Outcome;
pub use property::{PropertyBuilder, ValidatorBuilder};
pub use registry::{
    converters, validators, ConverterRegistry, Registration, ValidatorEntry, ValidatorRegistry,
};
pub use schema::{Schema, SchemaBuilder, SchemaValidatorBuilder};
pub use value::is_empty;

/// Prelude for the common surface.
pub mod prelude {
    pub use crate::error::{codes, ConfigError, SchemaError, ValidationError};
    pub use crate::outcome::Outcome;
    pub use crate::property::PropertyBuilder;
    pub use crate::registry::{converters, validators};
    pub use crate::schema::Schema;
    pub use crate::types::{any, array, boolean, number, object, string};
}
