//! Combining errors, and turning panics into errors.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::carrier::recover;
use crate::codes;
use crate::config;
use crate::error::{StructuredError, KIND_PANIC};
use crate::SharedError;

/// A plain error annotated with the message of another.
///
/// Displays as `"<context>: <source>"`; `source()` is the wrapped error.
#[derive(Debug)]
pub struct ContextError {
    context: String,
    source: SharedError,
}

impl ContextError {
    pub fn new(context: impl Into<String>, source: SharedError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn into_error(self) -> SharedError {
        Arc::new(self)
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

/// Combine two errors, preferring structured ones.
///
/// - both `None`: `None`
/// - neither sealed: `b` wrapped with `a`'s message as context, or
///   whichever one is present
/// - exactly one sealed: a copy of it absorbs the other, pins the other
///   as its cause, and is resealed
/// - both sealed: a copy of `a` absorbs `b` and pins `a` as its cause
///
/// Caller-held errors are never modified.
pub fn wrap(a: Option<SharedError>, b: Option<SharedError>) -> Option<SharedError> {
    let sealed_a = a.as_deref().and_then(|e| recover(e)).cloned();
    let sealed_b = b.as_deref().and_then(|e| recover(e)).cloned();

    match (sealed_a, sealed_b) {
        (None, None) => match (a, b) {
            (Some(a), Some(b)) => Some(ContextError::new(a.to_string(), b).into_error()),
            (a, b) => a.or(b),
        },
        (Some(ea), None) => Some(ea.with_error(b.clone()).with_cause(b).into_error()),
        (None, Some(eb)) => Some(eb.with_error(a.clone()).with_cause(a).into_error()),
        (Some(ea), Some(_)) => Some(ea.with_error(b).with_cause(a).into_error()),
    }
}

/// Combine any number of errors, preferring structured ones.
///
/// `None` entries are skipped. The first sealed entry is copied and every
/// entry, that one included, is absorbed into the copy in input order.
/// Without a sealed entry the errors are folded left with [`ContextError`];
/// a single error comes back unchanged.
pub fn join<I>(errs: I) -> Option<SharedError>
where
    I: IntoIterator<Item = Option<SharedError>>,
{
    let errs: Vec<SharedError> = errs.into_iter().flatten().collect();

    let Some(first) = errs.iter().find_map(|e| recover(&**e)) else {
        return fold_plain(errs);
    };
    let mut acc = first.clone_with_stack(1);
    for err in errs {
        acc = acc.with_error(err);
    }
    Some(acc.into_error())
}

fn fold_plain(errs: Vec<SharedError>) -> Option<SharedError> {
    let mut iter = errs.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |root, next| {
        ContextError::new(root.to_string(), next).into_error()
    }))
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<StructuredError>() {
        e.summary()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Convert a panic payload into a `PANIC` error with status 500 and a
/// captured stack. `None` yields `None`.
pub fn from_panic(payload: Option<&(dyn Any + Send)>) -> Option<StructuredError> {
    let payload = payload?;
    let cfg = config::get();
    Some(
        StructuredError::new(KIND_PANIC)
            .with_message(format!("panic: {}", panic_message(payload)))
            .with_status(codes::INTERNAL_SERVER_ERROR)
            .capture_stack(cfg.panic_skip, cfg.panic_frames),
    )
}

/// Run `f`, converting a panic into a sealed `PANIC` error.
///
/// `None` is a successful no-op. The panic hook still runs as usual.
pub fn catch_panic<F>(f: Option<F>) -> Result<(), SharedError>
where
    F: FnOnce(),
{
    let Some(f) = f else {
        return Ok(());
    };
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => Ok(()),
        Err(payload) => {
            let err = from_panic(Some(&*payload))
                .unwrap_or_else(|| StructuredError::new(KIND_PANIC));
            tracing::debug!(id = %err.id(), message = %err.message(), "panic converted to error");
            Err(err.into_error())
        }
    }
}
