//! HTTP response emission.
//!
//! An error is written to a [`ResponseSink`] as a single JSON body with
//! `Content-Type: application/json`. The sink is the only I/O this crate
//! performs.

use std::io::{self, Write};

use thiserror::Error;

use crate::codes;
use crate::config;
use crate::error::{from_error, StructuredError};
use crate::SharedError;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Errors reported by a response sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("response write failed: {0}")]
    Io(#[from] io::Error),

    #[error("response already written")]
    AlreadyWritten,
}

/// Something that transmits one response: status, content type, body.
pub trait ResponseSink {
    fn write_response(&mut self, status: u16, content_type: &str, body: &[u8]) -> Result<(), SinkError>;
}

/// In-memory sink that records the response it was given.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    status: Option<u16>,
    content_type: String,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded status, or `None` before the first write.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text; invalid UTF-8 is replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl ResponseSink for BufferedResponse {
    fn write_response(&mut self, status: u16, content_type: &str, body: &[u8]) -> Result<(), SinkError> {
        if self.status.is_some() {
            return Err(SinkError::AlreadyWritten);
        }
        self.status = Some(status);
        self.content_type = content_type.to_string();
        self.body = body.to_vec();
        Ok(())
    }
}

/// Sink that writes a raw HTTP/1.1 response to any `io::Write`.
#[derive(Debug)]
pub struct HttpWriter<W: Write> {
    inner: W,
    written: bool,
}

impl<W: Write> HttpWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: false }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ResponseSink for HttpWriter<W> {
    fn write_response(&mut self, status: u16, content_type: &str, body: &[u8]) -> Result<(), SinkError> {
        if self.written {
            return Err(SinkError::AlreadyWritten);
        }
        self.written = true;

        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            status,
            codes::reason_phrase(status),
            content_type,
            body.len()
        )
        .into_bytes();
        head.extend_from_slice(body);
        self.inner.write_all(&head)?;
        self.inner.flush()?;
        Ok(())
    }
}

impl StructuredError {
    /// Write this error as a JSON response.
    ///
    /// Uses the configured default status (500) when none is set, and the
    /// redacted body when `safe`. A `None` sink writes nothing.
    pub fn write_http(&self, sink: Option<&mut dyn ResponseSink>, safe: bool) -> Result<(), SinkError> {
        let Some(sink) = sink else {
            return Ok(());
        };
        let status = match self.status_code {
            0 => config::get().default_status,
            s => s,
        };
        let body = if safe { self.to_json_safe() } else { self.to_json() };

        tracing::debug!(status, safe, id = %self.id, "writing error response");
        sink.write_response(status, CONTENT_TYPE_JSON, body.as_bytes())
            .inspect_err(|e| tracing::warn!(error = %e, status, "error response write failed"))
    }
}

/// Write any generic error as a JSON response.
///
/// Sealed errors are written as themselves; plain errors go through
/// [`from_error`] and therefore answer 501.
pub fn write_http_error(
    sink: Option<&mut dyn ResponseSink>,
    safe: bool,
    err: &SharedError,
) -> Result<(), SinkError> {
    from_error(err).write_http(sink, safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::sync::Arc;

    #[test]
    fn writes_status_and_body() {
        let mut rec = BufferedResponse::new();
        let e = StructuredError::new("Unauthorized").with_status(401).with_message("nope");
        e.write_http(Some(&mut rec), true).unwrap();
        assert_eq!(rec.status(), Some(401));
        assert_eq!(rec.content_type(), CONTENT_TYPE_JSON);
        assert!(rec.body_text().contains("nope"));
    }

    #[test]
    fn unset_status_defaults_to_500() {
        let mut rec = BufferedResponse::new();
        StructuredError::new("X").write_http(Some(&mut rec), false).unwrap();
        assert_eq!(rec.status(), Some(500));
    }

    #[test]
    fn safe_flag_selects_body() {
        let e = StructuredError::new("S").with_meta("token", "s3cret").with_redacted_key("token");

        let mut safe = BufferedResponse::new();
        e.write_http(Some(&mut safe), true).unwrap();
        assert!(safe.body_text().contains("[REDACTED]"));
        assert!(!safe.body_text().contains("s3cret"));

        let mut full = BufferedResponse::new();
        e.write_http(Some(&mut full), false).unwrap();
        assert!(full.body_text().contains("s3cret"));
    }

    #[test]
    fn none_sink_is_noop() {
        assert!(StructuredError::new("X").write_http(None, true).is_ok());
    }

    #[test]
    fn second_write_rejected() {
        let mut rec = BufferedResponse::new();
        let e = StructuredError::new("X").with_status(400);
        e.write_http(Some(&mut rec), true).unwrap();
        let again = e.write_http(Some(&mut rec), true);
        assert!(matches!(again, Err(SinkError::AlreadyWritten)));
        assert_eq!(rec.status(), Some(400));
    }

    #[test]
    fn raw_http_writer() {
        let mut w = HttpWriter::new(Vec::new());
        let e = StructuredError::new("NF").with_status(404).with_message("gone");
        e.write_http(Some(&mut w), true).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(head.contains(&format!("Content-Length: {}", body.len())));
        assert!(body.contains("gone"));
    }

    #[test]
    fn plain_error_answers_501() {
        let err: SharedError = Arc::from(Box::<dyn Error + Send + Sync>::from("plain"));
        let mut rec = BufferedResponse::new();
        write_http_error(Some(&mut rec), true, &err).unwrap();
        assert_eq!(rec.status(), Some(501));
        assert!(rec.body_text().contains("plain"));
    }

    #[test]
    fn sealed_error_keeps_status() {
        let err = StructuredError::new("C").with_status(409).into_error();
        let mut rec = BufferedResponse::new();
        write_http_error(Some(&mut rec), false, &err).unwrap();
        assert_eq!(rec.status(), Some(409));
    }
}
