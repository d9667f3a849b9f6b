//! Call-stack capture.
//!
//! Frames come from `std::backtrace::Backtrace::force_capture()`, rendered
//! and parsed back into `(file, line, function)` triples. The backtrace
//! machinery and this crate's capture helpers are stripped from the top of
//! the stack, so `skip = 0` names the code that asked for the capture.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use serde::{Deserialize, Serialize};

/// One resolved stack frame.
///
/// `file` is empty and `line` is 0 when the binary carries no debug info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.function)
    }
}

/// Leading frames that belong to the capture itself.
const INTERNAL_PREFIXES: &[&str] = &[
    "std::backtrace",
    "<std::backtrace",
    "serror::stack::",
    "<serror::stack::",
    "serror::error::StructuredError::capture_",
];

/// Walk the current call stack.
///
/// Returns at most `max_frames` frames, starting `skip` frames above the
/// caller. Never fails: an unsupported platform yields an empty vector.
pub fn walk(skip: usize, max_frames: usize) -> Vec<StackFrame> {
    if max_frames == 0 {
        return Vec::new();
    }
    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    parse(&backtrace.to_string(), skip, max_frames)
}

/// Parse the short `Display` rendering of a `Backtrace`.
///
/// Frame lines look like `   3: path::to::function`; the optional
/// following `at file:line:col` line carries the location. Inlined
/// symbols appear as extra name lines without an index and become frames
/// of their own.
pub(crate) fn parse(rendered: &str, skip: usize, max_frames: usize) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();
    for raw in rendered.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                if last.file.is_empty() {
                    let (file, lineno) = split_location(location);
                    last.file = file;
                    last.line = lineno;
                }
            }
            continue;
        }
        let function = match line.split_once(": ") {
            Some((index, name)) if index.bytes().all(|b| b.is_ascii_digit()) => name,
            _ => line,
        };
        frames.push(StackFrame {
            function: function.to_string(),
            ..Default::default()
        });
    }

    frames
        .into_iter()
        .skip_while(|f| INTERNAL_PREFIXES.iter().any(|p| f.function.starts_with(p)))
        .skip(skip)
        .take(max_frames)
        .collect()
}

/// Split `file:line:col` (or `file:line`) into file and line.
fn split_location(location: &str) -> (String, u32) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next().unwrap_or_default();
    let middle = parts.next();
    let rest = parts.next();
    match (middle, rest) {
        (Some(line), Some(file)) => match line.parse() {
            Ok(n) => (file.to_string(), n),
            Err(_) => (location.to_string(), 0),
        },
        (Some(file), None) => match last.parse() {
            Ok(n) => (file.to_string(), n),
            Err(_) => (location.to_string(), 0),
        },
        _ => (location.to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/abc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/abc/library/std/src/backtrace.rs:331:13
   2: serror::stack::walk
             at ./crates/serror/src/stack.rs:52:20
   3: serror::error::StructuredError::capture_stack
             at ./crates/serror/src/error.rs:200:23
   4: app::handlers::create_user
             at ./src/handlers.rs:41:9
      app::handlers::inlined_helper
             at ./src/handlers.rs:12:5
   5: app::main
   6: core::ops::function::FnOnce::call_once
             at /rustc/abc/library/core/src/ops/function.rs:250:5
";

    #[test]
    fn strips_internal_frames() {
        let frames = parse(SAMPLE, 0, 32);
        assert_eq!(frames[0].function, "app::handlers::create_user");
        assert_eq!(frames[0].file, "./src/handlers.rs");
        assert_eq!(frames[0].line, 41);
    }

    #[test]
    fn inlined_symbols_become_frames() {
        let frames = parse(SAMPLE, 0, 32);
        assert_eq!(frames[1].function, "app::handlers::inlined_helper");
        assert_eq!(frames[1].line, 12);
    }

    #[test]
    fn missing_location_is_empty() {
        let frames = parse(SAMPLE, 0, 32);
        assert_eq!(frames[2].function, "app::main");
        assert!(frames[2].file.is_empty());
        assert_eq!(frames[2].line, 0);
    }

    #[test]
    fn skip_and_budget() {
        let frames = parse(SAMPLE, 1, 2);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].function, "app::handlers::inlined_helper");
        assert_eq!(frames[1].function, "app::main");
    }

    #[test]
    fn empty_rendering() {
        assert_eq!(parse("", 0, 8), Vec::new());
        assert_eq!(parse(SAMPLE, 40, 8), Vec::new());
    }

    #[test]
    fn location_forms() {
        assert_eq!(split_location("a.rs:10:4"), ("a.rs".to_string(), 10));
        assert_eq!(split_location("a.rs:10"), ("a.rs".to_string(), 10));
        assert_eq!(split_location("C:/x/a.rs:7:1"), ("C:/x/a.rs".to_string(), 7));
        assert_eq!(split_location("weird"), ("weird".to_string(), 0));
    }

    #[test]
    fn live_walk_has_frames() {
        let frames = walk(0, 8);
        assert!(!frames.is_empty());
        assert!(frames.len() <= 8);
        assert!(frames.iter().all(|f| !f.function.starts_with("std::backtrace")));
    }

    #[test]
    fn zero_budget_is_empty() {
        assert!(walk(0, 0).is_empty());
    }

    #[test]
    fn frame_display() {
        let f = StackFrame { file: "a.rs".into(), line: 3, function: "m::f".into() };
        assert_eq!(f.to_string(), "a.rs:3 m::f");
    }
}
