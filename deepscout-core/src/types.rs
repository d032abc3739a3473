//! Data model for research requests, results, and the engine contract.

use serde::{Deserialize, Serialize};

use crate::config::{ResearchConfig, MAX_LOOPS_OR_QUERIES, RECOGNIZED_MODELS};
use crate::error::ResearchError;

/// Maximum topic length in characters, measured after trimming.
pub const MAX_TOPIC_CHARS: usize = 5000;

/// A research request as submitted by the caller. Immutable once built;
/// omitted fields are filled from configuration during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_research_loops: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_search_query_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_model: Option<String>,
}

impl ResearchRequest {
    /// Build a request with all optional fields left to configured defaults.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            max_research_loops: None,
            initial_search_query_count: None,
            reasoning_model: None,
        }
    }

    pub fn with_max_research_loops(mut self, loops: u32) -> Self {
        self.max_research_loops = Some(loops);
        self
    }

    pub fn with_initial_search_query_count(mut self, count: u32) -> Self {
        self.initial_search_query_count = Some(count);
        self
    }

    pub fn with_reasoning_model(mut self, model: impl Into<String>) -> Self {
        self.reasoning_model = Some(model.into());
        self
    }

    /// Validate the request and apply configured defaults.
    ///
    /// Validation is purely local: it never touches admission state, so a
    /// rejected request leaves the adapter's counters untouched.
    pub fn resolve(&self, config: &ResearchConfig) -> Result<ResolvedRequest, ResearchError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::Validation {
                reason: "research topic cannot be empty".into(),
            });
        }
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(ResearchError::Validation {
                reason: format!("research topic too long (max {MAX_TOPIC_CHARS} characters)"),
            });
        }

        let max_research_loops = self
            .max_research_loops
            .unwrap_or(config.default_max_research_loops);
        if max_research_loops == 0 || max_research_loops > MAX_LOOPS_OR_QUERIES {
            return Err(ResearchError::Validation {
                reason: format!(
                    "max_research_loops must be between 1 and {MAX_LOOPS_OR_QUERIES}"
                ),
            });
        }

        let initial_search_query_count = self
            .initial_search_query_count
            .unwrap_or(config.default_initial_search_query_count);
        if initial_search_query_count == 0 || initial_search_query_count > MAX_LOOPS_OR_QUERIES {
            return Err(ResearchError::Validation {
                reason: format!(
                    "initial_search_query_count must be between 1 and {MAX_LOOPS_OR_QUERIES}"
                ),
            });
        }

        let reasoning_model = self
            .reasoning_model
            .clone()
            .unwrap_or_else(|| config.default_reasoning_model.clone());
        if !RECOGNIZED_MODELS.contains(&reasoning_model.as_str()) {
            return Err(ResearchError::Validation {
                reason: format!(
                    "unrecognized reasoning_model '{}', must be one of: {}",
                    reasoning_model,
                    RECOGNIZED_MODELS.join(", ")
                ),
            });
        }

        Ok(ResolvedRequest {
            topic: topic.to_string(),
            max_research_loops,
            initial_search_query_count,
            reasoning_model,
        })
    }
}

/// A validated request with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub topic: String,
    pub max_research_loops: u32,
    pub initial_search_query_count: u32,
    pub reasoning_model: String,
}

/// The uniform result of one research call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Full research report, taken from the engine's final message.
    pub report: String,
    /// Source URLs in engine emission order; duplicates are preserved.
    pub sources: Vec<String>,
    pub metadata: ResearchMetadata,
}

/// Execution statistics attached to every successful result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchMetadata {
    pub queries_executed: usize,
    pub research_loops: u32,
    pub total_sources: usize,
    /// Wall-clock elapsed seconds, rounded to 2 decimals.
    pub execution_time: f64,
    pub reasoning_model: String,
    pub request_id: u64,
}

/// Initial state handed to the engine for one research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    pub topic: String,
    pub max_research_loops: u32,
    pub initial_search_query_count: u32,
    pub reasoning_model: String,
}

impl EngineState {
    pub fn from_request(request: &ResolvedRequest) -> Self {
        Self {
            topic: request.topic.clone(),
            max_research_loops: request.max_research_loops,
            initial_search_query_count: request.initial_search_query_count,
            reasoning_model: request.reasoning_model.clone(),
        }
    }
}

/// Per-run model configuration for the engine's internal phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRunConfig {
    pub query_generator_model: String,
    pub reflection_model: String,
    pub answer_model: String,
}

impl EngineRunConfig {
    pub fn from_config(config: &ResearchConfig, reasoning_model: &str) -> Self {
        Self {
            query_generator_model: config.query_generator_model.clone(),
            reflection_model: config.reflection_model.clone(),
            answer_model: reasoning_model.to_string(),
        }
    }
}

/// A message produced by the engine during a run. The last message of a
/// completed run carries the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineMessage {
    pub role: String,
    pub content: String,
}

impl EngineMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A source gathered by the engine; `value` carries the URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSource {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl EngineSource {
    pub fn url(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title: None,
        }
    }
}

/// Everything the engine reports back from one completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineOutcome {
    pub messages: Vec<EngineMessage>,
    pub sources_gathered: Vec<EngineSource>,
    pub search_queries: Vec<String>,
    pub research_loop_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ResearchConfig {
        ResearchConfig::default()
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let resolved = ResearchRequest::new("rust async runtimes")
            .resolve(&config())
            .unwrap();
        assert_eq!(resolved.max_research_loops, 2);
        assert_eq!(resolved.initial_search_query_count, 3);
        assert_eq!(resolved.reasoning_model, "gemini-2.5-pro");
    }

    #[test]
    fn test_resolve_keeps_explicit_fields() {
        let resolved = ResearchRequest::new("rust async runtimes")
            .with_max_research_loops(4)
            .with_initial_search_query_count(5)
            .with_reasoning_model("gemini-1.5-pro")
            .resolve(&config())
            .unwrap();
        assert_eq!(resolved.max_research_loops, 4);
        assert_eq!(resolved.initial_search_query_count, 5);
        assert_eq!(resolved.reasoning_model, "gemini-1.5-pro");
    }

    #[test]
    fn test_resolve_trims_topic() {
        let resolved = ResearchRequest::new("  padded topic  ")
            .resolve(&config())
            .unwrap();
        assert_eq!(resolved.topic, "padded topic");
    }

    #[test]
    fn test_empty_topic_rejected() {
        let err = ResearchRequest::new("").resolve(&config()).unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[test]
    fn test_whitespace_topic_rejected() {
        let err = ResearchRequest::new("   \t\n ")
            .resolve(&config())
            .unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[test]
    fn test_topic_length_boundary() {
        let exactly_max = "x".repeat(MAX_TOPIC_CHARS);
        assert!(ResearchRequest::new(exactly_max).resolve(&config()).is_ok());

        let one_over = "x".repeat(MAX_TOPIC_CHARS + 1);
        let err = ResearchRequest::new(one_over)
            .resolve(&config())
            .unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[test]
    fn test_topic_length_counts_chars_not_bytes() {
        // Multi-byte characters: 5000 of them exceed 5000 bytes but are
        // exactly at the character limit.
        let topic = "é".repeat(MAX_TOPIC_CHARS);
        assert!(topic.len() > MAX_TOPIC_CHARS);
        assert!(ResearchRequest::new(topic).resolve(&config()).is_ok());
    }

    #[test]
    fn test_zero_loops_rejected() {
        let err = ResearchRequest::new("topic")
            .with_max_research_loops(0)
            .resolve(&config())
            .unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[test]
    fn test_excessive_query_count_rejected() {
        let err = ResearchRequest::new("topic")
            .with_initial_search_query_count(11)
            .resolve(&config())
            .unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[test]
    fn test_unrecognized_model_rejected() {
        let err = ResearchRequest::new("topic")
            .with_reasoning_model("not-a-model")
            .resolve(&config())
            .unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[test]
    fn test_request_serialization_skips_omitted_fields() {
        let json = serde_json::to_value(ResearchRequest::new("topic")).unwrap();
        assert_eq!(json, serde_json::json!({ "topic": "topic" }));
    }
}
