//! # simplelog
//! Leveled logger writing timestamped, source-located lines to any writer.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! simplelog = "0.1.0"
//! ```
//!
//! ```rust
//! use simplelog::{FormatOptions, Logger, Severity};
//!
//! let logger = Logger::new(std::io::stdout(), "[example] ", FormatOptions::SHORT_FILE, 0);
//! logger.set_level(Severity::INFO);
//!
//! simplelog::debug!(logger, "this", " won't", " be", " logged");
//! simplelog::info!(logger, "this", " will", " be", " logged");
//! simplelog::errorf!(logger, "this {} be logged", "will");
//! ```
//!
//! Each line is built as `<prefix>[date ][time ][file:line: ][LEVEL] message\n`
//! and written with a single call under the logger's lock, so threads sharing
//! a logger never interleave lines.
//!
//! ## Configuration
//! ```rust
//! use simplelog::{FormatOptions, SharedBuffer, Severity, logger_config};
//!
//! let out = SharedBuffer::new();
//! let logger = logger_config()
//!     .with_prefix("[app] ")
//!     .with_options(FormatOptions::STD | FormatOptions::UTC | FormatOptions::LONG_FILE)
//!     .with_level(Severity::INFO)
//!     .build(out.clone());
//! simplelog::info!(logger, "answer=", 42);
//! assert!(out.contents().ends_with("[INFO] answer=42\n"));
//! ```
//!
//! Settings can also come from `SIMPLELOG_LEVEL`, `SIMPLELOG_FLAGS` and
//! `SIMPLELOG_POOL_SIZE`, see [`ConfigBuilder::with_env`].
//!
//! ## Logging to files
//! ```rust
//! use simplelog::{FormatOptions, LogFile, Logger};
//!
//! let file = LogFile::new("/tmp/simplelog_doc.log").expect("Unable to open log file");
//! let logger = Logger::new(file, "", FormatOptions::NONE, 0);
//! simplelog::info!(logger, "Hello, world!");
//! assert!(std::fs::read_to_string("/tmp/simplelog_doc.log").unwrap().ends_with("[INFO] Hello, world!\n"));
//! ```

mod buffer_pool;
mod caller;
mod config;
mod format;
mod log_writer;
mod logger;
mod macros;
mod severity;

pub use buffer_pool::{BufferPool, PooledBuffer};
pub use caller::{CallSite, ResolveCaller, TrackedCaller};
pub use config::EnvConfig;
pub use format::{Arg, FormatOptions, zero_pad};
pub use log_writer::{LogFile, SharedBuffer};
pub use logger::Logger;
pub use severity::Severity;

use std::io::Write;

/// Builder for configuring and creating a [`Logger`].
pub struct ConfigBuilder {
    prefix: String,
    options: FormatOptions,
    caller_depth: usize,
    level: Severity,
    resolver: Box<dyn ResolveCaller>,
    pool: Option<BufferPool>,
    pool_size: usize,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            options: FormatOptions::NONE,
            caller_depth: 0,
            level: Severity::DEBUG,
            resolver: Box::new(TrackedCaller::default()),
            pool: None,
            pool_size: config::DEFAULT_POOL_SIZE,
        }
    }
}

impl ConfigBuilder {
    /// Sets the text written at the start of every line.
    pub fn with_prefix(self, prefix: &str) -> Self {
        Self {
            prefix: prefix.into(),
            ..self
        }
    }
    /// Sets the header segments.
    pub fn with_options(self, options: FormatOptions) -> Self {
        Self { options, ..self }
    }
    /// Sets how many frames above the logger the call site is resolved at.
    pub fn with_caller_depth(self, caller_depth: usize) -> Self {
        Self {
            caller_depth,
            ..self
        }
    }
    /// Sets the initial minimum severity.
    pub fn with_level(self, level: Severity) -> Self {
        Self { level, ..self }
    }
    /// Replaces the `#[track_caller]` based call-site resolver.
    pub fn with_resolver<R: ResolveCaller + 'static>(self, resolver: R) -> Self {
        Self {
            resolver: Box::new(resolver),
            ..self
        }
    }
    /// Shares an existing buffer pool instead of creating one.
    pub fn with_pool(self, pool: BufferPool) -> Self {
        Self {
            pool: Some(pool),
            ..self
        }
    }
    /// Overrides level, format options and pool size from `SIMPLELOG_*`
    /// environment variables. Unset variables keep their defaults.
    pub fn with_env(self) -> Result<Self, std::io::Error> {
        self.with_env_config(&EnvConfig::load()?)
    }
    /// Applies already loaded environment settings.
    pub fn with_env_config(self, env: &EnvConfig) -> Result<Self, std::io::Error> {
        Ok(Self {
            level: env.level()?,
            options: env.options()?,
            pool_size: env.POOL_SIZE,
            ..self
        })
    }
    /// Creates the logger writing to `sink`.
    pub fn build<W: Write + Send>(self, sink: W) -> Logger<W> {
        let Self {
            prefix,
            options,
            caller_depth,
            level,
            resolver,
            pool,
            pool_size,
        } = self;
        let pool = pool.unwrap_or_else(|| BufferPool::new(pool_size));
        let logger = Logger::from_parts(sink, prefix, options, caller_depth, resolver, pool);
        logger.set_level(level);
        logger
    }
}

/// Returns a default ConfigBuilder for configuring a logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
