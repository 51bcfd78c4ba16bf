//! Property type constructors.
//!
//! Each returns a fresh [`PropertyBuilder`] carrying the type tag; all
//! further behavior (requiredness, converters, validators) is attached
//! through the builder. The tag itself is descriptive metadata.

use crate::property::PropertyBuilder;

/// A string property.
pub fn string() -> PropertyBuilder {
    PropertyBuilder::new("string")
}

/// A numeric property.
pub fn number() -> PropertyBuilder {
    PropertyBuilder::new("number")
}

/// A boolean property.
pub fn boolean() -> PropertyBuilder {
    PropertyBuilder::new("boolean")
}

/// An array property.
pub fn array() -> PropertyBuilder {
    PropertyBuilder::new("array")
}

/// A nested object property.
pub fn object() -> PropertyBuilder {
    PropertyBuilder::new("object")
}

/// A property of unconstrained type.
pub fn any() -> PropertyBuilder {
    PropertyBuilder::new("any")
}
