//! The opaque error that transports a [`StructuredError`] through generic
//! error channels.
//!
//! A [`Carrier`] is a plain `std::error::Error` with a message, a bag of
//! type-erased attributes, and an optional cause exposed through
//! `source()`. Sealing stores the entity under [`ENTITY_KEY`]; recovery
//! probes a generic error for the [`Attributed`] capability and downcasts
//! that attribute back.

use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::cause::Cause;
use crate::error::StructuredError;
use crate::SharedError;

/// Reserved attribute key holding the sealed entity.
pub const ENTITY_KEY: &str = "serror.entity";

/// Type-erased attribute values.
pub type Attributes = HashMap<String, Box<dyn Any + Send + Sync>>;

/// Capability: exposes an attribute lookup.
///
/// [`attributes_of`] and [`recover`] only look at [`Carrier`]; implementing
/// this for another type gives it the same lookup API, not recoverability.
pub trait Attributed {
    fn attributes(&self) -> &Attributes;

    fn attribute(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.attributes().get(key).map(|v| &**v)
    }
}

/// Minimal opaque error with attributes and a cause.
pub struct Carrier {
    message: String,
    attributes: Attributes,
    cause: Option<Cause>,
}

impl Carrier {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attributes: Attributes::new(),
            cause: None,
        }
    }

    /// Replace the whole attribute bag.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Insert one attribute, replacing any previous value under `key`.
    pub fn with_attribute<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.attributes.insert(key.into(), Box::new(value));
        self
    }

    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    pub fn into_error(self) -> SharedError {
        Arc::new(self)
    }
}

impl Attributed for Carrier {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl Error for Carrier {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(Cause::root)
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Carrier")
            .field("message", &self.message)
            .field("attributes", &keys)
            .field("cause", &self.cause)
            .finish()
    }
}

/// Attribute view of `err` when it is a [`Carrier`].
///
/// Only the error itself is inspected, never its sources. Other types that
/// implement [`Attributed`] are not recognised here; sealing always goes
/// through `Carrier`, so it is the only type recovery looks for.
pub fn attributes_of<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a dyn Attributed> {
    err.downcast_ref::<Carrier>().map(|c| c as &dyn Attributed)
}

/// Recover the entity sealed inside `err`, if any.
pub fn recover<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a StructuredError> {
    attributes_of(err)?
        .attribute(ENTITY_KEY)?
        .downcast_ref::<StructuredError>()
}
