/*!
Logging and profiling setup for the command-line tools.

Log lines always go to standard error so standard output carries nothing but
data. `RUST_LOG` selects the filter; without it only warnings are shown.

Two implementations expose the same API:

- real: compiled when `feature = "profiling"` is set. Adds a `tracing-chrome`
  layer when `ENABLE_PROFILING` is present in the environment; the returned
  guard flushes the trace file when dropped.
- stub: logging only.
*/

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(feature = "profiling")]
mod inner {
    use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    /// Keeps the profiling trace open; flushes it on drop
    #[must_use = "dropping the guard ends the profiling session"]
    pub struct LoggingGuard {
        _chrome: Option<FlushGuard>,
    }

    /// Initialize logging and, when `ENABLE_PROFILING` is set, chrome tracing.
    pub fn setup_logging_and_profiling() -> LoggingGuard {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(super::env_filter());

        let (chrome_layer, guard) = if crate::get_env::<String>("ENABLE_PROFILING").is_some() {
            let (layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        let profiling = chrome_layer.is_some();
        if tracing_subscriber::registry()
            .with(chrome_layer)
            .with(fmt_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global subscriber already installed");
        }
        if profiling {
            tracing::info!("ENABLE_PROFILING set - chrome trace recording for this run");
        }

        LoggingGuard { _chrome: guard }
    }
}

#[cfg(not(feature = "profiling"))]
mod inner {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    /// Nothing to flush without profiling
    #[must_use]
    pub struct LoggingGuard;

    /// Initialize logging; profiling is a no-op here.
    pub fn setup_logging_and_profiling() -> LoggingGuard {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(super::env_filter());
        if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
            tracing::debug!("Global subscriber already installed");
        }
        LoggingGuard
    }
}

// Re-export a stable API surface regardless of which `inner` module was compiled.
pub use inner::{LoggingGuard, setup_logging_and_profiling};
