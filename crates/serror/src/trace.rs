//! Copying request correlation keys from a lookup context into metadata.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde_json::Value;

use crate::error::StructuredError;

/// Correlation keys recognised by [`StructuredError::with_trace`], in the
/// order they are copied.
pub const TRACE_KEYS: [&str; 6] = [
    "trace_id",
    "traceId",
    "request_id",
    "requestId",
    "correlation_id",
    "correlationId",
];

/// A keyed lookup that may carry request correlation values.
pub trait TraceContext {
    fn trace_value(&self, key: &str) -> Option<Value>;
}

impl<V, S> TraceContext for HashMap<String, V, S>
where
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn trace_value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

impl<V> TraceContext for BTreeMap<String, V>
where
    V: Clone + Into<Value>,
{
    fn trace_value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Into::into)
    }
}

impl StructuredError {
    /// Copy every [`TRACE_KEYS`] entry present in `ctx` into metadata.
    pub fn with_trace<C>(self, ctx: Option<&C>) -> Self
    where
        C: TraceContext + ?Sized,
    {
        let Some(ctx) = ctx else {
            return self;
        };
        TRACE_KEYS.iter().fold(self, |err, key| match ctx.trace_value(key) {
            Some(value) => err.with_meta(*key, value),
            None => err,
        })
    }
}
