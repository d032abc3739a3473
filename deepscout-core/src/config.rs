//! Configuration for the research adapter.
//!
//! Uses `figment` for layered configuration: defaults -> `deepscout.toml` ->
//! environment variables prefixed with `DEEPSCOUT_`. A `.env` file is loaded
//! first via `dotenvy` so deployments can keep overrides next to the binary.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Model identifiers the adapter accepts for `reasoning_model`.
pub const RECOGNIZED_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Upper bound for per-request research loops and initial query counts.
pub const MAX_LOOPS_OR_QUERIES: u32 = 10;

/// Adapter and server-level configuration.
///
/// `host`, `port`, and `log_level` are consumed by the transport embedder and
/// the logging bootstrap; everything else feeds request defaulting and the
/// admission/deadline policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Bind address for the embedding server, if any.
    pub host: String,
    /// Bind port for the embedding server, if any.
    pub port: u16,
    /// Log level filter for the tracing bootstrap.
    pub log_level: String,
    /// Default number of research iterations when the request omits it.
    pub default_max_research_loops: u32,
    /// Default number of initial search queries when the request omits it.
    pub default_initial_search_query_count: u32,
    /// Default model for final answer generation when the request omits it.
    pub default_reasoning_model: String,
    /// Model the engine uses to generate search queries.
    pub query_generator_model: String,
    /// Model the engine uses for the reflection step.
    pub reflection_model: String,
    /// Deadline for one research call, in seconds.
    pub request_timeout_secs: u64,
    /// Concurrency ceiling for in-flight research calls.
    pub max_concurrent_requests: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            default_max_research_loops: 2,
            default_initial_search_query_count: 3,
            default_reasoning_model: "gemini-2.5-pro".to_string(),
            query_generator_model: "gemini-2.0-flash".to_string(),
            reflection_model: "gemini-2.5-flash".to_string(),
            request_timeout_secs: 300,
            max_concurrent_requests: 10,
        }
    }
}

impl ResearchConfig {
    /// Load configuration from defaults, `deepscout.toml`, and the
    /// environment (variables prefixed with `DEEPSCOUT_`).
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("deepscout.toml"))
            .merge(Env::prefixed("DEEPSCOUT_"))
            .extract()
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                message: "port must be between 1 and 65535".into(),
            });
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "invalid log level '{}', must be one of: {}",
                    self.log_level,
                    valid_levels.join(", ")
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "request_timeout_secs must be positive".into(),
            });
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid {
                message: "max_concurrent_requests must be positive".into(),
            });
        }
        for (name, value) in [
            ("default_max_research_loops", self.default_max_research_loops),
            (
                "default_initial_search_query_count",
                self.default_initial_search_query_count,
            ),
        ] {
            if value == 0 || value > MAX_LOOPS_OR_QUERIES {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be between 1 and {MAX_LOOPS_OR_QUERIES}"),
                });
            }
        }
        if !RECOGNIZED_MODELS.contains(&self.default_reasoning_model.as_str()) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "unrecognized default_reasoning_model '{}'",
                    self.default_reasoning_model
                ),
            });
        }
        Ok(())
    }
}
