//! Admission control for concurrent research calls.
//!
//! The gate is accept-or-reject only: there is no wait queue, no fairness
//! guarantee beyond "first to observe a free slot wins". Both counters live
//! behind a single mutex with strictly bounded critical sections (counter
//! arithmetic only, never I/O), and snapshots read both under the same lock
//! so stats are never torn.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ResearchError;

/// Admission receipt pairing one acquire with exactly one release.
///
/// Tickets are deliberately neither `Clone` nor `Copy`: `release` consumes
/// the ticket, so releasing twice is a compile error rather than a runtime
/// precondition.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
}

impl RequestTicket {
    /// Monotonically increasing request id, assigned at admission time.
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Default)]
struct GateState {
    total_requests: u64,
    active_requests: usize,
}

/// Consistent view of the gate's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub total_requests: u64,
    pub active_requests: usize,
    pub max_concurrent_requests: usize,
}

/// Tracks in-flight request count against a configured ceiling.
#[derive(Debug)]
pub struct AdmissionGate {
    max_concurrent: usize,
    state: Mutex<GateState>,
}

impl AdmissionGate {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Try to admit one request.
    ///
    /// At capacity this fails without touching `total_requests`; otherwise
    /// both counters are incremented atomically and the ticket id is the
    /// post-increment value of `total_requests`.
    pub fn try_acquire(&self) -> Result<RequestTicket, ResearchError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.active_requests >= self.max_concurrent {
            return Err(ResearchError::CapacityExceeded {
                max: self.max_concurrent,
            });
        }
        state.active_requests += 1;
        state.total_requests += 1;
        let ticket = RequestTicket {
            id: state.total_requests,
        };
        debug!(
            request_id = ticket.id,
            active = state.active_requests,
            "admitted request"
        );
        Ok(ticket)
    }

    /// Release one admitted request. Consumes the ticket.
    pub fn release(&self, ticket: RequestTicket) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.active_requests = state.active_requests.saturating_sub(1);
        debug!(
            request_id = ticket.id,
            active = state.active_requests,
            "released request"
        );
    }

    /// Read both counters plus the ceiling under one lock.
    pub fn snapshot(&self) -> GateSnapshot {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        GateSnapshot {
            total_requests: state.total_requests,
            active_requests: state.active_requests,
            max_concurrent_requests: self.max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

/// RAII wrapper that releases its ticket when dropped, guaranteeing exactly
/// one release on every path that reached admission.
pub struct TicketGuard<'a> {
    gate: &'a AdmissionGate,
    ticket: Option<RequestTicket>,
}

impl<'a> TicketGuard<'a> {
    pub fn new(gate: &'a AdmissionGate, ticket: RequestTicket) -> Self {
        Self {
            gate,
            ticket: Some(ticket),
        }
    }

    pub fn request_id(&self) -> u64 {
        // The ticket is only taken in Drop, so it is always present here.
        self.ticket.as_ref().map(|t| t.id()).unwrap_or_default()
    }
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.gate.release(ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_acquire_increments_both_counters() {
        let gate = AdmissionGate::new(2);
        let ticket = gate.try_acquire().unwrap();
        assert_eq!(ticket.id(), 1);

        let snap = gate.snapshot();
        assert_eq!(snap.total_requests, 1);
        assert_eq!(snap.active_requests, 1);
        assert_eq!(snap.max_concurrent_requests, 2);
    }

    #[test]
    fn test_rejection_at_capacity_leaves_total_untouched() {
        let gate = AdmissionGate::new(1);
        let _held = gate.try_acquire().unwrap();

        let err = gate.try_acquire().unwrap_err();
        assert!(matches!(err, ResearchError::CapacityExceeded { max: 1 }));
        assert_eq!(gate.snapshot().total_requests, 1);
    }

    #[test]
    fn test_release_frees_a_slot() {
        let gate = AdmissionGate::new(1);
        let ticket = gate.try_acquire().unwrap();
        gate.release(ticket);

        let ticket = gate.try_acquire().unwrap();
        assert_eq!(ticket.id(), 2);
        let snap = gate.snapshot();
        assert_eq!(snap.active_requests, 1);
        assert_eq!(snap.total_requests, 2);
    }

    #[test]
    fn test_ticket_ids_are_monotonic() {
        let gate = AdmissionGate::new(10);
        let mut last = 0;
        for _ in 0..5 {
            let ticket = gate.try_acquire().unwrap();
            assert!(ticket.id() > last);
            last = ticket.id();
            gate.release(ticket);
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let gate = AdmissionGate::new(1);
        {
            let guard = TicketGuard::new(&gate, gate.try_acquire().unwrap());
            assert_eq!(guard.request_id(), 1);
            assert_eq!(gate.snapshot().active_requests, 1);
        }
        assert_eq!(gate.snapshot().active_requests, 0);
    }

    #[test]
    fn test_guard_releases_on_panic_unwind() {
        let gate = AdmissionGate::new(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = TicketGuard::new(&gate, gate.try_acquire().unwrap());
            panic!("worker blew up");
        }));
        assert!(result.is_err());
        assert_eq!(gate.snapshot().active_requests, 0);
    }

    #[test]
    fn test_concurrent_acquires_respect_ceiling() {
        use std::sync::Arc;

        let gate = Arc::new(AdmissionGate::new(4));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let gate = Arc::clone(&gate);
            handles.push(std::thread::spawn(move || gate.try_acquire().is_ok()));
        }
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|&admitted| admitted)
            .count();

        assert_eq!(admitted, 4);
        let snap = gate.snapshot();
        assert_eq!(snap.active_requests, 4);
        assert_eq!(snap.total_requests, 4);
    }
}
