#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros so downstream crates can log through `popkit_core` without a
//! direct dependency. The `tracing-json` feature additionally provides a
//! one-call JSON subscriber for production hosts.
//!
//! Without either feature the module is empty and instrumentation compiles
//! away.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, trace, trace_span, warn};

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset or invalid. Returns an
/// error if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> Result<(), LoggingInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| LoggingInitError(err.to_string()))
}

/// A global subscriber could not be installed.
#[cfg(feature = "tracing-json")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingInitError(String);

#[cfg(feature = "tracing-json")]
impl std::fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install log subscriber: {}", self.0)
    }
}

#[cfg(feature = "tracing-json")]
impl std::error::Error for LoggingInitError {}
