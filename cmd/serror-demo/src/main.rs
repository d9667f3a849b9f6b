//! serror demo
//!
//! Builds a validation error, joins it with an I/O failure, logs it, and
//! writes it out as HTTP responses on stdout.
//!
//! # Environment Variables
//!
//! - `SERROR_LOG=debug` - Log filter (default `info`)
//! - `SERROR_STACK_FRAMES=8` - Frames captured for panics and explicit stacks

use std::io;
use std::panic;
use std::sync::Arc;

use serror::{
    catch_panic, codes, join, recover, serr, string_detail, HttpWriter, ResponseSink, SResult,
    SharedError,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

// SERROR_LOG=debug cargo run -p serror-demo
fn main() {
    init_logging();

    println!("=== serror demo ===\n");

    let err = match signup("not-an-email") {
        Ok(()) => return,
        Err(err) => err,
    };

    let Some(entity) = recover(&*err) else {
        tracing::error!(error = %err, "signup returned an unstructured error");
        return;
    };

    tracing::info!(
        fields = %serde_json::Value::Object(entity.to_fields()),
        "signup failed"
    );
    println!("{}\n", string_detail(&*err));

    // Each writer answers exactly one response.
    for (title, safe) in [("safe", true), ("full", false)] {
        println!("--- {} response ---", title);
        let mut out = HttpWriter::new(io::stdout());
        if let Err(e) = entity.write_http(Some(&mut out as &mut dyn ResponseSink), safe) {
            tracing::error!(error = %e, safe, "response write failed");
        }
        println!("\n");
    }

    // Keep the default hook from printing over the demo output.
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let caught = catch_panic(Some(|| {
        let empty: Vec<u32> = Vec::new();
        let _ = empty[3];
    }));
    panic::set_hook(hook);

    match caught {
        Ok(()) => println!("no panic"),
        Err(err) => {
            if let Some(entity) = recover(&*err) {
                println!("--- caught panic ---\n{:#}", entity);
            }
        }
    }

    println!("\n=== demo complete ===");
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SERROR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn signup(email: &str) -> SResult<()> {
    let mut trace = std::collections::HashMap::new();
    trace.insert("request_id".to_string(), "req-1234".to_string());

    let validation = serr!("Validation", "signup for {} rejected", email)
        .with_status(codes::BAD_REQUEST)
        .with_custom_code("E_SIGNUP")
        .with_context("signup")
        .with_meta("api_token", "tok_live_51H8")
        .with_redacted_key("api_token")
        .with_field_error("email", "format", "must contain '@'")
        .with_trace(Some(&trace))
        .into_error();

    let io_err: SharedError = Arc::new(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "audit log unreachable",
    ));

    match join([Some(validation), Some(io_err)]) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
