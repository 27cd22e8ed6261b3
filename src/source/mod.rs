//! Data acquisition for metrics snapshots.
//!
//! This module owns the fetch side of the dashboard: the wire types for
//! metrics payloads and the polling source that periodically re-fetches
//! them from an HTTP endpoint, substituting a caller-supplied fallback
//! dataset on failure.
//!
//! Consumers never see a fetch failure as a fault; they read
//! [`FetchSnapshot`] values that always carry a usable dataset once the
//! first cycle has completed.

mod payload;
mod poller;

pub use payload::{MetricsSnapshot, SeriesPayload};
pub use poller::{FetchError, PollingSource};

/// Lifecycle phase of the polling state machine.
///
/// `Idle` only exists before the first cycle begins; `Loading` is
/// re-entered on every scheduled refresh; `Ready` and `Failed` are
/// terminal per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// The latest published fetch state.
///
/// Transitions are owned exclusively by [`PollingSource`]; consumers only
/// read snapshots. Re-entering `Loading` carries the previous data and
/// error forward, so a dashboard refreshing in the background never loses
/// what it is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSnapshot<T> {
    pub phase: FetchPhase,
    /// Latest payload: the fetched data on `Ready`, the fallback on
    /// `Failed`, carried forward on `Loading`, `None` only before the
    /// first cycle completes.
    pub data: Option<T>,
    /// Human-readable description of the last failure, cleared on `Ready`.
    pub error: Option<String>,
}

impl<T> FetchSnapshot<T> {
    /// The state before `start()` has published anything.
    pub fn idle() -> Self {
        Self {
            phase: FetchPhase::Idle,
            data: None,
            error: None,
        }
    }

    /// True while a fetch cycle is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_snapshot_is_empty() {
        let snap = FetchSnapshot::<Vec<f64>>::idle();
        assert_eq!(snap.phase, FetchPhase::Idle);
        assert!(snap.data().is_none());
        assert!(snap.error().is_none());
        assert!(!snap.is_loading());
    }
}
