//! Error types for the deepscout execution adapter.
//!
//! Uses `thiserror` for public API error types. The taxonomy distinguishes
//! failures the caller can act on: retry later (`CapacityExceeded`), fix the
//! input (`Validation`), or treat as an engine-side fault (`Timeout`,
//! `EmptyResult`, `Execution`).

/// Top-level error type for the research adapter.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// Malformed input. Never consumes an admission slot.
    #[error("invalid research request: {reason}")]
    Validation { reason: String },

    /// Admission rejected because the concurrency ceiling is reached.
    /// The caller may retry later; no computation was started.
    #[error("too many concurrent requests (max: {max})")]
    CapacityExceeded { max: usize },

    /// Execution exceeded the configured deadline. The admission slot is
    /// released, but the underlying blocking computation may still be
    /// running to completion in the background; its result is discarded.
    #[error("research timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The engine completed but produced no messages.
    #[error("research engine returned no messages")]
    EmptyResult,

    /// Any other engine-side failure, with the original cause flattened
    /// into the message.
    #[error("research execution failed: {message}")]
    Execution { message: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the configuration layer.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `ResearchError`.
pub type Result<T> = std::result::Result<T, ResearchError>;
