//! Entry points and line protocol driver for batch command-line tools
//!
//! This crate provides the pieces shared by tools that read one record per
//! line, transform it, and write one line back:
//!
//! - [`io`]: input sources (standard input, a file, or an in-memory string) and output sinks
//! - [`driver`]: comment splitting, tokenizing, and the per-line loop with failure isolation
//! - [`format`]: fixed-point number formatting at a clamped precision
//! - [`cli`]: argument parsing helpers with the exit-code conventions of the tools
//! - [`logging`]: `tracing` setup with optional chrome profiling
//!
//! # Usage
//!
//! ```ignore
//! let driver = LineDriver::new(FormatConfig::default()).with_comment_delimiter(Some("#".into()));
//! let input = InputSource::from_args(None, None, ";")?.open()?;
//! let mut output = OutputSink::Stdout.open()?;
//! let stats = driver.run(&handler, input, &mut output)?;
//! std::process::exit(stats.exit_code());
//! ```

pub mod cli;
pub mod driver;
pub mod format;
pub mod io;
pub mod logging;

// Re-export commonly used types
pub use cli::{get_env, parse_args, parse_args_from, parse_or_exit};
pub use driver::{LineDriver, LineHandler, RecordOutcome, RunStats, SplitLine, split_comment, tokenize};
pub use format::{FormatConfig, MAX_PRECISION, Precision, format_fixed};
pub use io::{InputSource, OutputSink};
pub use logging::{LoggingGuard, setup_logging_and_profiling};

mod metadata;
pub use metadata::{log_version_info, short_version_info};

/// Setup failures of the driver; all of them end the run before any record is read
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Cannot specify --input-string and --input-file together")]
    ConflictingInputs,

    #[error("Line separator must be a single character")]
    LineSeparator(String),

    #[error("Cannot open input file {path}: {source}")]
    OpenInput {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot open output file {path}: {source}")]
    OpenOutput {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;
