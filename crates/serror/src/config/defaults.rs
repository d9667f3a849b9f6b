//! Library defaults, used when no environment override is present.

/// Frame budget for `capture_stack` when the caller passes 0.
pub const STACK_FRAMES: usize = 32;

/// Frames skipped above `from_panic` when it captures the stack.
pub const PANIC_SKIP: usize = 1;

/// Frame budget for panic conversion.
pub const PANIC_FRAMES: usize = 64;

/// Record the constructor's call site in the single-frame stack line.
pub const CAPTURE_ON_NEW: bool = false;

/// Status written by HTTP emission when the error has none.
pub const DEFAULT_STATUS: u16 = 500;
