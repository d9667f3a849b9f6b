//! # serror — Structured Error
//!
//! A structured error entity that travels through ordinary
//! `std::error::Error` channels and comes back out intact.
//!
//! ## Design
//!
//! [`StructuredError`] carries a kind, an HTTP status, a custom code, a
//! message, metadata with per-key redaction, field errors, a correlation
//! id, a captured stack and nested children. It is built by value with
//! chained `with_*` calls.
//!
//! Sealing ([`StructuredError::into_error`], or `?` through
//! `From<StructuredError> for SharedError`) hides the entity inside a
//! [`Carrier`], a plain error whose `source()` is the pinned root cause.
//! Any code holding a [`SharedError`] can call [`recover`] to get the entity
//! back, or [`from_error`] to get one whether or not it was sealed.
//!
//! Output comes in two views:
//!
//! - **full**: [`to_json`](StructuredError::to_json), `{:#}`, and
//!   [`to_fields`](StructuredError::to_fields) for log fields
//! - **safe**: [`to_json_safe`](StructuredError::to_json_safe) replaces every
//!   redacted metadata value with [`REDACTED`]
//!
//! ## Ownership
//!
//! Builders consume `self`, so an entity under construction has exactly one
//! owner and needs no locking. Sealed errors are immutable and shared as
//! `Arc`; [`wrap`] and [`join`] copy before they change anything.
//!
//! ## Quick Start
//!
//! ```rust
//! use serror::{recover, serr, SResult};
//!
//! fn load(user: u32) -> SResult<()> {
//!     Err(serr!("NotFound", "user {} missing", user)
//!         .with_status(404)
//!         .with_meta("token", "s3cret")
//!         .with_redacted_key("token")
//!         .into_error())
//! }
//!
//! let err = load(7).unwrap_err();
//! let entity = recover(&*err).unwrap();
//! assert_eq!(entity.status_code(), 404);
//! assert!(!entity.to_json_safe().contains("s3cret"));
//! ```
//!
//! ## Configuration
//!
//! Stack depth, panic capture and the emission default status come from
//! `SERROR_*` environment variables; see [`config`].

pub mod config;
mod id;
mod stack;
mod cause;
mod carrier;
pub mod codes;
#[macro_use]
mod macros;
mod error;
mod serialize;
mod http;
mod compose;
mod trace;

use std::sync::Arc;

// ── Public API ────────────────────────────────────────────────────

pub use error::{
    from_error, string_detail, FieldError, Metadata, StructuredError, KIND_GENERAL, KIND_PANIC,
};
pub use carrier::{attributes_of, recover, Attributed, Attributes, Carrier, ENTITY_KEY};
pub use cause::{chain, root_of, Cause};
pub use stack::StackFrame;
pub use codes::RpcCode;
pub use serialize::REDACTED;
pub use http::{
    write_http_error, BufferedResponse, HttpWriter, ResponseSink, SinkError, CONTENT_TYPE_JSON,
};
pub use compose::{catch_panic, from_panic, join, panic_message, wrap, ContextError};
pub use trace::{TraceContext, TRACE_KEYS};

/// The generic error every sealed entity travels as.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience Result alias.
pub type SResult<T> = Result<T, SharedError>;
