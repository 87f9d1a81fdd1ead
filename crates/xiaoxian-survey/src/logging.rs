//! Diagnostic output for `xsurvey`.
//!
//! Survey answers, dashboards and JSON go to stdout. Everything logged here
//! goes to stderr, so `xsurvey dashboard --format json > out.json` stays clean.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much `xsurvey` reports about loading, saving and validation.
///
/// Chosen by the `-q` and `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `-q`: storage or config failures only.
    Quiet,
    /// Load and save summaries.
    #[default]
    Normal,
    /// `-v`: also rejected answers and slot reads and writes.
    Verbose,
    /// `-vv`.
    Trace,
}

impl Verbosity {
    /// The most detailed level that is still printed.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive for this crate's events.
    ///
    /// Events from dependencies are dropped unless `RUST_LOG` asks for them.
    #[must_use]
    pub fn directive(&self) -> String {
        format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            self.to_level_filter()
        )
    }
}

/// Install the stderr subscriber.
///
/// A set `RUST_LOG` replaces the filter built from `verbosity`. Calling this
/// again is harmless; the first subscriber stays.
///
/// # Examples
///
/// ```no_run
/// use xiaoxian_survey::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}

/// Show store and form warnings in test output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
