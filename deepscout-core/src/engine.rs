//! The research engine seam.
//!
//! The engine is an opaque, long-running, *blocking* collaborator. The
//! adapter never inspects its internals; it hands over an initial state plus
//! per-run model configuration and receives a completed outcome or an
//! arbitrary engine error, which the adapter wraps without interpretation.

use std::sync::Mutex;

use crate::types::{EngineOutcome, EngineRunConfig, EngineState};

/// A blocking research computation.
///
/// `invoke` may take minutes and must therefore never be called on an async
/// scheduler thread; the adapter dispatches it via `spawn_blocking`.
/// Implementations must be `Send + Sync` so one engine instance can serve
/// concurrent requests.
pub trait ResearchEngine: Send + Sync {
    /// Run one research computation to completion.
    fn invoke(&self, state: EngineState, config: &EngineRunConfig) -> anyhow::Result<EngineOutcome>;
}

/// An engine that replays canned outcomes, for tests and embedder smoke
/// checks. Outcomes are consumed in FIFO order; when the queue is empty the
/// last queued outcome is repeated.
#[derive(Default)]
pub struct StaticEngine {
    outcomes: Mutex<Vec<EngineOutcome>>,
    fallback: Mutex<Option<EngineOutcome>>,
}

impl StaticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome to be returned by the next `invoke` call.
    pub fn queue_outcome(&self, outcome: EngineOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(outcome);
    }
}

impl ResearchEngine for StaticEngine {
    fn invoke(
        &self,
        _state: EngineState,
        _config: &EngineRunConfig,
    ) -> anyhow::Result<EngineOutcome> {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(|e| e.into_inner());
        let mut fallback = self.fallback.lock().unwrap_or_else(|e| e.into_inner());
        if outcomes.is_empty() {
            return Ok(fallback.clone().unwrap_or_default());
        }
        let outcome = outcomes.remove(0);
        *fallback = Some(outcome.clone());
        Ok(outcome)
    }
}
