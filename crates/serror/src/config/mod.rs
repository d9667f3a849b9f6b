//! serror configuration
//!
//! Library defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. An explicit [`init`] before first use
//! 2. Environment variables
//! 3. Library defaults ([`defaults`])
//!
//! # Example
//!
//! ```rust
//! use serror::config::{self, Config};
//!
//! // Customize programmatically before any error is built.
//! let installed = config::init(Config::from_env().stack_frames(16));
//! assert!(installed || config::get().stack_frames > 0);
//! ```

pub mod defaults;
mod env;

use once_cell::sync::OnceCell;

use env::{env_get, env_get_bool};

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Process-wide error capture settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Frame budget used when `capture_stack` is given 0
    pub stack_frames: usize,
    /// Frames skipped by panic conversion
    pub panic_skip: usize,
    /// Frame budget for panic conversion
    pub panic_frames: usize,
    /// Record the constructor's caller as the single-frame stack line
    pub capture_on_new: bool,
    /// Status written by HTTP emission when the error has none
    pub default_status: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Config {
    /// Create config from library defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `SERROR_STACK_FRAMES` - Default frame budget
    /// - `SERROR_PANIC_SKIP` - Frames skipped by panic conversion
    /// - `SERROR_PANIC_FRAMES` - Frame budget for panic conversion
    /// - `SERROR_CAPTURE_ON_NEW` - Capture the call site in `new` (0/1)
    /// - `SERROR_DEFAULT_STATUS` - HTTP status when none is set
    pub fn from_env() -> Self {
        let defaults = Self::new();
        Self {
            stack_frames: env_get("SERROR_STACK_FRAMES", defaults.stack_frames),
            panic_skip: env_get("SERROR_PANIC_SKIP", defaults.panic_skip),
            panic_frames: env_get("SERROR_PANIC_FRAMES", defaults.panic_frames),
            capture_on_new: env_get_bool("SERROR_CAPTURE_ON_NEW", defaults.capture_on_new),
            default_status: env_get("SERROR_DEFAULT_STATUS", defaults.default_status),
        }
        .sanitized()
    }

    /// Create config with explicit defaults (no env override).
    pub fn new() -> Self {
        Self {
            stack_frames: defaults::STACK_FRAMES,
            panic_skip: defaults::PANIC_SKIP,
            panic_frames: defaults::PANIC_FRAMES,
            capture_on_new: defaults::CAPTURE_ON_NEW,
            default_status: defaults::DEFAULT_STATUS,
        }
    }

    /// Set the default frame budget. Zero restores the library default.
    pub fn stack_frames(mut self, n: usize) -> Self {
        self.stack_frames = n;
        self.sanitized()
    }

    /// Set the number of frames skipped by panic conversion.
    pub fn panic_skip(mut self, n: usize) -> Self {
        self.panic_skip = n;
        self
    }

    /// Set the panic conversion frame budget. Zero restores the library default.
    pub fn panic_frames(mut self, n: usize) -> Self {
        self.panic_frames = n;
        self.sanitized()
    }

    /// Enable or disable call-site capture in `new`.
    pub fn capture_on_new(mut self, enable: bool) -> Self {
        self.capture_on_new = enable;
        self
    }

    /// Set the fallback HTTP status. Zero restores the library default.
    pub fn default_status(mut self, status: u16) -> Self {
        self.default_status = status;
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        if self.stack_frames == 0 {
            self.stack_frames = defaults::STACK_FRAMES;
        }
        if self.panic_frames == 0 {
            self.panic_frames = defaults::PANIC_FRAMES;
        }
        if self.default_status == 0 {
            self.default_status = defaults::DEFAULT_STATUS;
        }
        self
    }
}

/// Install the process-wide config.
///
/// Returns `false` if a config was already installed or read; the existing
/// one stays in effect.
pub fn init(config: Config) -> bool {
    CONFIG.set(config).is_ok()
}

/// The process-wide config, read from the environment on first use.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}
