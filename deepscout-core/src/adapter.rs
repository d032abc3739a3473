//! The execution adapter: orchestrates validation, admission, deadline-bounded
//! execution of the blocking engine, progress streaming, and result assembly.
//!
//! Per-request state machine:
//! `Received -> Validated -> Admitted -> Running -> {Completed | TimedOut | Failed}`,
//! with `Rejected` reachable directly from `Received` when admission fails.
//! Every path that reached `Admitted` releases its admission slot exactly
//! once, enforced by an RAII ticket guard.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ResearchConfig;
use crate::engine::ResearchEngine;
use crate::error::{ResearchError, Result};
use crate::gate::{AdmissionGate, TicketGuard};
use crate::progress::{NoopSink, ProgressSink};
use crate::types::{
    EngineOutcome, EngineRunConfig, EngineState, ResearchMetadata, ResearchRequest, ResearchResult,
    ResolvedRequest,
};
use crate::util::{format_elapsed, round2, topic_preview};

/// Characters of the topic shown in progress messages and logs.
const TOPIC_PREVIEW_CHARS: usize = 100;

/// Overall adapter readiness, as reported by [`ResearchAdapter::health_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of a lightweight synthetic readiness check. No real research call
/// is performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub active_requests: usize,
    pub total_requests: u64,
    pub max_concurrent_requests: usize,
    pub engine_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only snapshot of cumulative/active counters and configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdapterStats {
    pub total_requests: u64,
    pub active_requests: usize,
    pub max_concurrent_requests: usize,
    pub request_timeout_secs: u64,
}

/// Adapter around a blocking [`ResearchEngine`].
///
/// The engine call is dispatched onto the blocking thread pool so the async
/// scheduler is never starved, and awaited under the configured deadline.
/// Admission is bounded by [`AdmissionGate`]; the gate's counters are the
/// only shared mutable state.
pub struct ResearchAdapter {
    engine: Arc<dyn ResearchEngine>,
    gate: AdmissionGate,
    config: ResearchConfig,
}

impl ResearchAdapter {
    pub fn new(engine: Arc<dyn ResearchEngine>, config: ResearchConfig) -> Self {
        let gate = AdmissionGate::new(config.max_concurrent_requests);
        Self {
            engine,
            gate,
            config,
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Execute a research request without progress notifications.
    pub async fn research(&self, request: ResearchRequest) -> Result<ResearchResult> {
        self.research_with_progress(request, &NoopSink).await
    }

    /// Execute a research request, streaming leveled progress events to
    /// `sink` in emission order.
    pub async fn research_with_progress(
        &self,
        request: ResearchRequest,
        sink: &dyn ProgressSink,
    ) -> Result<ResearchResult> {
        let started = Instant::now();

        // Validation is local: a rejected request never touches the gate.
        let resolved = request.resolve(&self.config)?;

        let ticket = match self.gate.try_acquire() {
            Ok(ticket) => ticket,
            Err(err) => {
                warn!(
                    active = self.gate.snapshot().active_requests,
                    "rejected research request at capacity"
                );
                sink.warning(&err.to_string()).await;
                return Err(err);
            }
        };
        let guard = TicketGuard::new(&self.gate, ticket);
        let request_id = guard.request_id();

        info!(
            request_id,
            topic = %topic_preview(&resolved.topic, TOPIC_PREVIEW_CHARS),
            "starting research"
        );
        sink.info(&format!(
            "Starting research on: {}",
            topic_preview(&resolved.topic, TOPIC_PREVIEW_CHARS)
        ))
        .await;
        sink.debug(&format!(
            "Config: loops={}, queries={}, model={}",
            resolved.max_research_loops,
            resolved.initial_search_query_count,
            resolved.reasoning_model
        ))
        .await;

        let outcome = self.run_engine(&resolved, request_id, sink).await?;

        let result = self
            .assemble_result(&resolved, request_id, started, outcome, sink)
            .await?;

        info!(
            request_id,
            execution_time = result.metadata.execution_time,
            total_sources = result.metadata.total_sources,
            "research completed"
        );
        Ok(result)
        // Guard drops here on every branch above, releasing the slot.
    }

    /// Dispatch the blocking engine call and await it under the deadline.
    ///
    /// On deadline expiry the worker is abandoned, not killed: the blocking
    /// call may run to completion in the background and its result is
    /// discarded. Only the adapter's wait is cancelled.
    async fn run_engine(
        &self,
        resolved: &ResolvedRequest,
        request_id: u64,
        sink: &dyn ProgressSink,
    ) -> Result<EngineOutcome> {
        let state = EngineState::from_request(resolved);
        let run_config = EngineRunConfig::from_config(&self.config, &resolved.reasoning_model);
        let engine = Arc::clone(&self.engine);
        let worker = tokio::task::spawn_blocking(move || engine.invoke(state, &run_config));

        let timeout_secs = self.config.request_timeout_secs;
        let deadline = Duration::from_secs(timeout_secs);

        match tokio::time::timeout(deadline, worker).await {
            Err(_elapsed) => {
                error!(request_id, timeout_secs, "research timed out");
                sink.error(&format!("Research timed out after {timeout_secs} seconds"))
                    .await;
                Err(ResearchError::Timeout { timeout_secs })
            }
            Ok(Err(join_err)) => {
                let message = format!("research worker terminated abnormally: {join_err}");
                error!(request_id, %message, "worker failure");
                sink.error(&format!("Research failed: {message}")).await;
                Err(ResearchError::Execution { message })
            }
            Ok(Ok(Err(engine_err))) => {
                let message = format!("{engine_err:#}");
                error!(request_id, %message, "engine failure");
                sink.error(&format!("Research failed: {message}")).await;
                Err(ResearchError::Execution { message })
            }
            Ok(Ok(Ok(outcome))) => Ok(outcome),
        }
    }

    /// Turn a completed engine outcome into the uniform result shape.
    async fn assemble_result(
        &self,
        resolved: &ResolvedRequest,
        request_id: u64,
        started: Instant,
        outcome: EngineOutcome,
        sink: &dyn ProgressSink,
    ) -> Result<ResearchResult> {
        let Some(final_message) = outcome.messages.last() else {
            error!(request_id, "engine returned no messages");
            sink.error("Research failed: no research results generated")
                .await;
            return Err(ResearchError::EmptyResult);
        };

        let sources: Vec<String> = outcome
            .sources_gathered
            .iter()
            .map(|s| s.value.clone())
            .collect();
        let elapsed = started.elapsed().as_secs_f64();

        let metadata = ResearchMetadata {
            queries_executed: outcome.search_queries.len(),
            research_loops: outcome.research_loop_count,
            total_sources: sources.len(),
            execution_time: round2(elapsed),
            reasoning_model: resolved.reasoning_model.clone(),
            request_id,
        };

        sink.info(&format!(
            "Research completed in {}",
            format_elapsed(elapsed)
        ))
        .await;
        sink.debug(&format!(
            "Generated {} sources, {} queries",
            metadata.total_sources, metadata.queries_executed
        ))
        .await;

        Ok(ResearchResult {
            report: final_message.content.clone(),
            sources,
            metadata,
        })
    }

    /// Lightweight synthetic readiness check. Resolves a minimal probe
    /// request against the configuration without invoking the engine; a
    /// probe failure marks the adapter unhealthy but never propagates.
    pub fn health_check(&self) -> HealthReport {
        let snap = self.gate.snapshot();
        match ResearchRequest::new("health check probe").resolve(&self.config) {
            Ok(_) => HealthReport {
                status: HealthStatus::Healthy,
                active_requests: snap.active_requests,
                total_requests: snap.total_requests,
                max_concurrent_requests: snap.max_concurrent_requests,
                engine_available: true,
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "health probe failed");
                HealthReport {
                    status: HealthStatus::Unhealthy,
                    active_requests: snap.active_requests,
                    total_requests: snap.total_requests,
                    max_concurrent_requests: snap.max_concurrent_requests,
                    engine_available: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Counters and limits, read in a single gate snapshot.
    pub fn stats(&self) -> AdapterStats {
        let snap = self.gate.snapshot();
        debug!(
            total = snap.total_requests,
            active = snap.active_requests,
            "stats snapshot"
        );
        AdapterStats {
            total_requests: snap.total_requests,
            active_requests: snap.active_requests,
            max_concurrent_requests: snap.max_concurrent_requests,
            request_timeout_secs: self.config.request_timeout_secs,
        }
    }
}
