//! # Deepscout Core
//!
//! Execution adapter for a long-running, blocking deep-research engine.
//! Provides bounded-concurrency admission control, deadline-bounded dispatch
//! onto the blocking thread pool, leveled progress streaming, uniform result
//! assembly, and health/stats reporting. The research algorithm itself lives
//! behind the [`ResearchEngine`] trait; transport layers (MCP, HTTP) embed
//! this crate and stay thin.

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod logging;
pub mod progress;
pub mod types;
pub mod util;

// Re-export commonly used types at the crate root.
pub use adapter::{AdapterStats, HealthReport, HealthStatus, ResearchAdapter};
pub use config::ResearchConfig;
pub use engine::{ResearchEngine, StaticEngine};
pub use error::{ConfigError, ResearchError, Result};
pub use gate::{AdmissionGate, GateSnapshot, RequestTicket};
pub use progress::{
    ChannelSink, NoopSink, ProgressEvent, ProgressLevel, ProgressSink, RecordingSink, TracingSink,
};
pub use types::{
    EngineMessage, EngineOutcome, EngineRunConfig, EngineSource, EngineState, ResearchMetadata,
    ResearchRequest, ResearchResult,
};
