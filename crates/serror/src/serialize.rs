//! Text and JSON views of a [`StructuredError`].
//!
//! | View              | Redacts metadata | Children |
//! |-------------------|------------------|----------|
//! | `summary` / `{}`  | no               | no       |
//! | `{:#}`            | no               | yes      |
//! | `to_json`         | no               | yes      |
//! | `to_json_safe`    | yes              | yes      |
//! | `to_fields`       | yes              | no       |
//!
//! JSON encoding failures produce an empty string, never an error.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FieldError, StructuredError};
use crate::stack::StackFrame;

/// Placeholder written in place of a redacted metadata value.
pub const REDACTED: &str = "[REDACTED]";

const SEPARATOR: &str = " , ";
const RULE: &str = " , -----------------------------------------------------------";

#[derive(Serialize)]
struct Wire<'a> {
    #[serde(rename = "Type", skip_serializing_if = "str::is_empty")]
    kind: &'a str,
    #[serde(rename = "WithValue", skip_serializing_if = "str::is_empty")]
    context_value: &'a str,
    #[serde(rename = "Msg", skip_serializing_if = "str::is_empty")]
    message: &'a str,
    #[serde(rename = "StatusCode")]
    status_code: u16,
    #[serde(rename = "CustomCode", skip_serializing_if = "str::is_empty")]
    custom_code: &'a str,
    #[serde(rename = "StackTrace", skip_serializing_if = "str::is_empty")]
    stack_line: &'a str,
    #[serde(rename = "StackFrames", skip_serializing_if = "Vec::is_empty")]
    stack_frames: &'a Vec<StackFrame>,
    #[serde(rename = "StackErrors", skip_serializing_if = "Vec::is_empty")]
    children: Vec<Wire<'a>>,
    #[serde(rename = "MetaData", skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<&'a str, Cow<'a, Value>>,
    #[serde(rename = "FieldErrors", skip_serializing_if = "Vec::is_empty")]
    field_errors: &'a Vec<FieldError>,
    #[serde(rename = "ID", skip_serializing_if = "str::is_empty")]
    id: &'a str,
}

impl StructuredError {
    fn wire(&self, safe: bool) -> Wire<'_> {
        Wire {
            kind: &self.kind,
            context_value: &self.context_value,
            message: &self.message,
            status_code: self.status_code,
            custom_code: &self.custom_code,
            stack_line: &self.stack_line,
            stack_frames: &self.stack_frames,
            children: self.children.iter().map(|c| c.wire(safe)).collect(),
            metadata: if safe {
                self.redacted_metadata()
            } else {
                self.metadata
                    .iter()
                    .map(|(k, v)| (k.as_str(), Cow::Borrowed(v)))
                    .collect()
            },
            field_errors: &self.field_errors,
            id: &self.id,
        }
    }

    /// Metadata with every redacted key masked.
    fn redacted_metadata(&self) -> BTreeMap<&str, Cow<'_, Value>> {
        self.metadata
            .iter()
            .map(|(k, v)| {
                let v = if self.redacted_keys.contains(k) {
                    Cow::Owned(Value::from(REDACTED))
                } else {
                    Cow::Borrowed(v)
                };
                (k.as_str(), v)
            })
            .collect()
    }

    /// Full-detail JSON. Redaction is not applied.
    pub fn to_json(&self) -> String {
        encode(&self.wire(false))
    }

    /// JSON with redacted metadata values replaced by `"[REDACTED]"`.
    pub fn to_json_safe(&self) -> String {
        encode(&self.wire(true))
    }

    /// Concise safe rendering; identical to [`to_json_safe`](Self::to_json_safe).
    pub fn string_safe(&self) -> String {
        self.to_json_safe()
    }

    /// Flattened fields for structured logging.
    ///
    /// `type`, `with`, `msg`, `statusCode`, `customCode` and `id` are always
    /// present; `stackTrace`, `stackFrames`, `fieldErrors` and `metaData`
    /// (redacted) only when non-empty.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("type".into(), Value::from(self.kind.as_str()));
        fields.insert("with".into(), Value::from(self.context_value.as_str()));
        fields.insert("msg".into(), Value::from(self.message.as_str()));
        fields.insert("statusCode".into(), Value::from(self.status_code));
        fields.insert("customCode".into(), Value::from(self.custom_code.as_str()));
        fields.insert("id".into(), Value::from(self.id.as_str()));

        if !self.stack_line.is_empty() {
            fields.insert("stackTrace".into(), Value::from(self.stack_line.as_str()));
        }
        if !self.stack_frames.is_empty() {
            insert_encoded(&mut fields, "stackFrames", &self.stack_frames);
        }
        if !self.field_errors.is_empty() {
            insert_encoded(&mut fields, "fieldErrors", &self.field_errors);
        }
        if !self.metadata.is_empty() {
            insert_encoded(&mut fields, "metaData", &self.redacted_metadata());
        }
        fields
    }

    /// One-line summary; also the message of the sealed error.
    ///
    /// `Type`, `With`, `Msg`, `CustomCode`, `MetaData` and `StatusCode`, each
    /// left out when empty (status when 0).
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(6);
        if !self.kind.is_empty() {
            parts.push(format!("Type: {}", self.kind));
        }
        if !self.context_value.is_empty() {
            parts.push(format!("With: {}", self.context_value));
        }
        if !self.message.is_empty() {
            parts.push(format!("Msg: {}", self.message));
        }
        if !self.custom_code.is_empty() {
            parts.push(format!("CustomCode: {}", self.custom_code));
        }
        if !self.metadata.is_empty() {
            parts.push(format!("MetaData: {}", encode(&self.metadata)));
        }
        if self.status_code != 0 {
            parts.push(format!("StatusCode: {}", self.status_code));
        }
        parts.join(SEPARATOR)
    }

    /// Multi-line full rendering, children included.
    fn detail(&self, out: &mut String) -> fmt::Result {
        if !self.kind.is_empty() {
            write!(out, "Type: {}{}", self.kind, SEPARATOR)?;
        }
        if !self.context_value.is_empty() {
            write!(out, "With: {}{}", self.context_value, SEPARATOR)?;
        }
        if !self.message.is_empty() {
            write!(out, "Msg: {}{}", self.message, SEPARATOR)?;
        }
        if !self.custom_code.is_empty() {
            write!(out, "CustomCode: {}{}", self.custom_code, SEPARATOR)?;
        }
        write!(out, "StatusCode: {}{}", self.status_code, SEPARATOR)?;
        if !self.stack_line.is_empty() {
            writeln!(out, "StackTrace: {}{}", self.stack_line, RULE)?;
        }
        if !self.stack_frames.is_empty() {
            out.push_str("StackFrames: ");
            for (i, f) in self.stack_frames.iter().enumerate() {
                write!(out, "[{}] {} ", i, f)?;
            }
            writeln!(out, "{}", RULE)?;
        }
        if !self.children.is_empty() {
            out.push_str("StackErrors: \n");
            for child in &self.children {
                out.push('[');
                child.detail(out)?;
                out.push_str("]\n");
            }
        }
        if !self.metadata.is_empty() {
            writeln!(out, "MetaData: {}", encode(&self.metadata))?;
            writeln!(out, "{}", RULE)?;
        }
        if !self.field_errors.is_empty() {
            writeln!(out, "FieldErrors: {:?}", self.field_errors)?;
            writeln!(out, "{}", RULE)?;
        }
        if !self.id.is_empty() {
            write!(out, "ID: {}", self.id)?;
        }
        Ok(())
    }
}

/// `{}` prints the summary, `{:#}` the full detail.
impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let mut out = String::new();
            self.detail(&mut out)?;
            f.write_str(&out)
        } else {
            f.write_str(&self.summary())
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "structured error JSON encoding failed");
        String::new()
    })
}

fn insert_encoded<T: Serialize + ?Sized>(fields: &mut Map<String, Value>, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(v) => {
            fields.insert(key.to_string(), v);
        }
        Err(e) => tracing::warn!(error = %e, field = key, "structured error field encoding failed"),
    }
}
