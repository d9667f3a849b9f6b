use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::carrier::{recover, Carrier, ENTITY_KEY};
use crate::cause::{chain, Cause};
use crate::codes::{self, RpcCode};
use crate::stack::{self, StackFrame};
use crate::{config, id, SharedError};

/// Kind given to errors synthesized from plain errors.
pub const KIND_GENERAL: &str = "GENERAL";

/// Kind given to errors converted from panics.
pub const KIND_PANIC: &str = "PANIC";

/// Free-form metadata attached to an error.
pub type Metadata = BTreeMap<String, Value>;

/// Returned by [`StructuredError::metadata_key`] for missing keys.
static EMPTY_VALUE: Value = Value::String(String::new());

/// One field-validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(rename = "msg")]
    pub message: String,
}

/// Structured Error — the rich, mutable error description.
///
/// Carries a human message, an HTTP-style status code, an application
/// code, metadata (with per-key redaction), captured stack information,
/// field-validation errors, absorbed child errors, and a pinned root
/// cause.
///
/// # Ownership
///
/// A `StructuredError` is a single-owner builder. Every `with_*` method
/// takes `self` and hands the same value back, so chains never copy:
///
/// ```
/// use serror::StructuredError;
///
/// let err = StructuredError::new("Validation")
///     .with_status(400)
///     .with_custom_code("USR-001")
///     .with_field_error("name", "required", "missing");
/// assert_eq!(err.field_errors().len(), 1);
/// ```
///
/// Mutation needs exclusive access. Share the sealed form
/// ([`into_error`](Self::into_error)) instead of the builder, and use
/// [`clone_with_stack`](Self::clone_with_stack) when a modified copy is
/// wanted. Read-only methods may run concurrently with each other.
#[derive(Debug, Clone)]
pub struct StructuredError {
    pub(crate) kind: String,
    pub(crate) context_value: String,
    pub(crate) message: String,
    pub(crate) status_code: u16,
    pub(crate) custom_code: String,
    pub(crate) stack_line: String,
    pub(crate) stack_frames: Vec<StackFrame>,
    pub(crate) metadata: Metadata,
    pub(crate) redacted_keys: BTreeSet<String>,
    pub(crate) id: String,
    pub(crate) field_errors: Vec<FieldError>,
    pub(crate) children: Vec<StructuredError>,
    pub(crate) cause: Option<Cause>,
}

// ── Constructors ──────────────────────────────────────────────────

impl StructuredError {
    /// Create an empty error of the given kind with a fresh correlation id.
    pub fn new(kind: impl Into<String>) -> Self {
        let err = Self {
            kind: kind.into(),
            context_value: String::new(),
            message: String::new(),
            status_code: 0,
            custom_code: String::new(),
            stack_line: String::new(),
            stack_frames: Vec::new(),
            metadata: Metadata::new(),
            redacted_keys: BTreeSet::new(),
            id: id::correlation_id().unwrap_or_default(),
            field_errors: Vec::new(),
            children: Vec::new(),
            cause: None,
        };
        if config::get().capture_on_new {
            return err.capture_frame(1);
        }
        err
    }

    /// Copy this error with a fresh single-frame stack line.
    ///
    /// Scalars, metadata, stack frames, field errors and redacted keys are
    /// copied into independent storage; `id` and the pinned cause are
    /// shared. Each child is re-absorbed through its sealed form.
    pub fn clone_with_stack(&self, skip: usize) -> Self {
        let mut e = Self::new(self.kind.clone())
            .with_custom_code(self.custom_code.clone())
            .with_status(self.status_code)
            .with_message(self.message.clone())
            .with_context(self.context_value.clone())
            .capture_frame(skip + 1)
            .with_metadata(self.metadata.clone());

        e.stack_frames = self.stack_frames.clone();
        e.field_errors = self.field_errors.clone();
        e.redacted_keys = self.redacted_keys.clone();
        e.id = self.id.clone();
        e.cause = self.cause.clone();

        for child in &self.children {
            e = e.with_error(child.to_error());
        }
        e
    }
}

// ── Builder surface ───────────────────────────────────────────────

impl StructuredError {
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the HTTP-style status. `0` means unset.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = status;
        self
    }

    pub fn with_custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = code.into();
        self
    }

    /// Set the disambiguating context tag.
    pub fn with_context(mut self, value: impl Into<String>) -> Self {
        self.context_value = value.into();
        self
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    /// Set the message after applying `(from, to)` substitutions.
    ///
    /// The message is scanned once, left to right; at each position the
    /// first pair whose `from` matches wins and replaced text is never
    /// rescanned. Empty `from` strings are ignored.
    pub fn with_message_replacing(mut self, msg: &str, pairs: &[(&str, &str)]) -> Self {
        self.message = replace_pairs(msg, pairs);
        self
    }

    /// Add or replace one metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a whole mapping into metadata. An empty mapping is a no-op.
    pub fn with_metadata<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.metadata
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Mark a metadata key as sensitive for every safe rendering.
    pub fn with_redacted_key(mut self, key: impl Into<String>) -> Self {
        self.redacted_keys.insert(key.into());
        self
    }

    /// Mark several metadata keys as sensitive.
    pub fn with_redacted_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.redacted_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_field_error(
        mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.field_errors.push(FieldError {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        });
        self
    }

    /// Override the correlation id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the status from an RPC code (see [`codes::from_rpc_code`]).
    pub fn with_rpc_code(mut self, code: impl Into<i32>) -> Self {
        self.status_code = codes::from_rpc_code(code.into());
        self
    }

    /// Record one frame, `skip` levels above the caller, as the stack line.
    ///
    /// The line reads `"<file>:<line> <function>"`; it stays untouched if
    /// no frame is available.
    #[inline(never)]
    pub fn capture_frame(mut self, skip: usize) -> Self {
        if let Some(frame) = stack::walk(skip, 1).into_iter().next() {
            self.stack_line = frame.to_string();
        }
        self
    }

    /// Replace the stack frames with up to `max_frames` frames starting
    /// `skip` levels above the caller. Zero selects the configured default.
    #[inline(never)]
    pub fn capture_stack(mut self, skip: usize, max_frames: usize) -> Self {
        let max_frames = if max_frames == 0 {
            config::get().stack_frames
        } else {
            max_frames
        };
        self.stack_frames = stack::walk(skip, max_frames);
        self
    }

    /// Set the stack line to an explicit location.
    #[doc(hidden)]
    pub fn with_location(mut self, file: &str, line: u32, function: &str) -> Self {
        self.stack_line = format!("{}:{} {}", file, line, function);
        self
    }

    /// Pin the root cause.
    ///
    /// The first error ever pinned wins; later calls are no-ops. The cause
    /// resolves to the deepest error reachable from that first one.
    pub fn with_cause(mut self, err: impl Into<Option<SharedError>>) -> Self {
        if self.cause.is_some() {
            return self;
        }
        if let Some(err) = err.into() {
            self.cause = Some(Cause::pin(err));
        }
        self
    }

    /// Absorb another error as children.
    ///
    /// A sealed error is attached as one child without walking its chain.
    /// Otherwise every link of the chain is attached: sealed links as
    /// themselves, plain links as `GENERAL` children carrying the link's
    /// message, and the plain chain's root is pinned as the cause.
    pub fn with_error(mut self, err: impl Into<Option<SharedError>>) -> Self {
        let Some(err) = err.into() else {
            return self;
        };
        if let Some(entity) = recover(&*err) {
            self.children.push(entity.clone());
            return self;
        }

        let mut saw_plain = false;
        for link in chain(&*err) {
            match recover(link) {
                Some(entity) => self.children.push(entity.clone()),
                None => {
                    saw_plain = true;
                    self.children
                        .push(StructuredError::new(KIND_GENERAL).with_message(link.to_string()));
                }
            }
        }
        // Every link shares the argument's root, so one pin covers them all.
        if saw_plain {
            self = self.with_cause(err);
        }
        self
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl StructuredError {
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn context_value(&self) -> &str {
        &self.context_value
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    #[inline]
    pub fn custom_code(&self) -> &str {
        &self.custom_code
    }

    /// Single-frame trace, `"<file>:<line> <function>"` or empty.
    #[inline]
    pub fn stack_line(&self) -> &str {
        &self.stack_line
    }

    #[inline]
    pub fn stack_frames(&self) -> &[StackFrame] {
        &self.stack_frames
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Value stored under `key`, or an empty string value when missing.
    ///
    /// Use [`has_metadata_key`](Self::has_metadata_key) to tell a missing
    /// key from a stored empty string.
    pub fn metadata_key(&self, key: &str) -> &Value {
        self.metadata.get(key).unwrap_or(&EMPTY_VALUE)
    }

    pub fn has_metadata_key(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    pub fn is_redacted(&self, key: &str) -> bool {
        self.redacted_keys.contains(key)
    }

    pub fn redacted_keys(&self) -> impl Iterator<Item = &str> {
        self.redacted_keys.iter().map(String::as_str)
    }

    /// Correlation id; empty only if id generation failed.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Absorbed errors, in attachment order.
    #[inline]
    pub fn children(&self) -> &[StructuredError] {
        &self.children
    }

    /// RPC code for the current status.
    pub fn rpc_code(&self) -> RpcCode {
        codes::to_rpc_code(self.status_code)
    }

    /// The best available explanation for this error.
    ///
    /// The pinned cause if any; otherwise the last child's cause, falling
    /// back to that child's sealed form. Only the last child is consulted.
    pub fn cause(&self) -> Option<Cause> {
        if let Some(cause) = &self.cause {
            return Some(cause.clone());
        }
        let last = self.children.last()?;
        last.cause().or_else(|| Some(Cause::pin(last.to_error())))
    }

    /// True if `err` resolves to an error with the same kind, context and
    /// custom code.
    pub fn matches(&self, err: &SharedError) -> bool {
        let other = from_error(err);
        other.custom_code == self.custom_code
            && other.context_value == self.context_value
            && other.kind == self.kind
    }
}

// ── Sealing ───────────────────────────────────────────────────────

impl StructuredError {
    /// Seal into a generic error.
    ///
    /// The carrier's message is the one-line summary and its source is
    /// this error's [`cause`](Self::cause).
    pub fn into_error(self) -> SharedError {
        let cause = self.cause();
        let mut carrier = Carrier::new(self.summary()).with_attribute(ENTITY_KEY, self);
        if let Some(cause) = cause {
            carrier = carrier.with_cause(cause);
        }
        carrier.into_error()
    }

    /// Seal a copy, leaving `self` usable.
    pub fn to_error(&self) -> SharedError {
        self.clone().into_error()
    }
}

impl From<StructuredError> for SharedError {
    fn from(err: StructuredError) -> Self {
        err.into_error()
    }
}

/// Recover the entity from `err`, or synthesize a `GENERAL` one.
///
/// The fallback has status 501, the error's message, and `err` pinned as
/// its cause.
pub fn from_error(err: &SharedError) -> StructuredError {
    match recover(&**err) {
        Some(entity) => entity.clone(),
        None => StructuredError::new(KIND_GENERAL)
            .with_status(codes::NOT_IMPLEMENTED)
            .with_message(err.to_string())
            .with_cause(err.clone()),
    }
}

/// Full rendering if `err` carries an entity, else its own message.
pub fn string_detail(err: &(dyn Error + 'static)) -> String {
    match recover(err) {
        Some(entity) => format!("{:#}", entity),
        None => err.to_string(),
    }
}

fn replace_pairs(msg: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.iter().all(|(from, _)| from.is_empty()) {
        return msg.to_string();
    }
    let mut out = String::with_capacity(msg.len());
    let mut rest = msg;
    'scan: while let Some(c) = rest.chars().next() {
        for (from, to) in pairs {
            if !from.is_empty() && rest.starts_with(from) {
                out.push_str(to);
                rest = &rest[from.len()..];
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
