//! Per-run-kind single-flight gating.
//!
//! Overlapping triggers of the same run kind (a manual run racing the daily
//! cron, two manual runs back to back) are rejected at the trigger surface;
//! distinct kinds may overlap. The engine itself stays re-entrant.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use trendcast_core::RunKind;

/// Tracks which run kinds are currently in flight.
#[derive(Debug, Default)]
pub struct RunGate {
    active: Mutex<HashSet<RunKind>>,
}

impl RunGate {
    /// Claim `kind` for a run. Returns `None` if a run of that kind is
    /// already in flight; otherwise a permit that releases on drop.
    #[must_use]
    pub fn try_begin(self: &Arc<Self>, kind: RunKind) -> Option<RunPermit> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if active.insert(kind) {
            Some(RunPermit {
                gate: Arc::clone(self),
                kind,
            })
        } else {
            None
        }
    }
}

/// RAII claim on a run kind; dropping it releases the kind.
#[derive(Debug)]
pub struct RunPermit {
    gate: Arc<RunGate>,
    kind: RunKind,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        let mut active = self
            .gate
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_kind_cannot_overlap() {
        let gate = Arc::new(RunGate::default());
        let permit = gate.try_begin(RunKind::Manual);
        assert!(permit.is_some());
        assert!(gate.try_begin(RunKind::Manual).is_none());
    }

    #[test]
    fn different_kinds_may_overlap() {
        let gate = Arc::new(RunGate::default());
        let _manual = gate.try_begin(RunKind::Manual).expect("first claim");
        assert!(gate.try_begin(RunKind::Daily).is_some());
    }

    #[test]
    fn dropping_the_permit_releases_the_kind() {
        let gate = Arc::new(RunGate::default());
        let permit = gate.try_begin(RunKind::Daily).expect("first claim");
        drop(permit);
        assert!(gate.try_begin(RunKind::Daily).is_some());
    }
}
