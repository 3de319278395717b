// Derived Queue State - computed on demand, never stored

use serde::{Deserialize, Serialize};

/// Processing status of the queue's state machine.
///
/// Common path: Idle -> Active -> Idle.
/// Shutdown path: Idle/Active -> Draining -> Stopped (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Idle,
    Active,
    Draining,
    Stopped,
}

impl ProcessingStatus {
    /// True while the queue still admits new items.
    pub fn accepts_work(&self) -> bool {
        matches!(self, ProcessingStatus::Idle | ProcessingStatus::Active)
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Idle => write!(f, "idle"),
            ProcessingStatus::Active => write!(f, "active"),
            ProcessingStatus::Draining => write!(f, "draining"),
            ProcessingStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Health signal reported via the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Degraded,
    Unavailable,
}

/// Outcome of the most recent processor invocation; drives the health signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastOutcome {
    Success,
    Failure,
}

/// Processing counters and timing, accumulated by the worker loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueMetrics {
    /// Items that completed successfully.
    pub items_processed: u64,
    /// Items whose processor invocation failed.
    pub items_failed: u64,
    /// Rolling average processing time over all terminal items, in ms.
    pub avg_processing_ms: f64,
}

impl QueueMetrics {
    /// Fold one terminal item's duration into the rolling average.
    pub fn record(&mut self, succeeded: bool, duration_ms: i64) {
        let prior_terminal = self.items_processed + self.items_failed;
        if succeeded {
            self.items_processed += 1;
        } else {
            self.items_failed += 1;
        }
        let terminal = prior_terminal + 1;
        self.avg_processing_ms +=
            (duration_ms as f64 - self.avg_processing_ms) / terminal as f64;
    }
}

/// Point-in-time snapshot of the live queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueState {
    pub depth: usize,
    pub processing_status: ProcessingStatus,
    pub health: Health,
    pub metrics: QueueMetrics,
}

/// Compute the health signal.
///
/// A failing processor dominates: Unavailable whenever the most recent
/// outcome was a failure with no success since, regardless of depth. The
/// depth signal only matters once the processor is demonstrably working.
pub fn compute_health(
    depth: usize,
    degraded_threshold: usize,
    last_outcome: Option<LastOutcome>,
) -> Health {
    match last_outcome {
        Some(LastOutcome::Failure) => Health::Unavailable,
        _ if depth >= degraded_threshold => Health::Degraded,
        _ => Health::Healthy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_prefers_failure_over_depth() {
        assert_eq!(
            compute_health(0, 50, Some(LastOutcome::Failure)),
            Health::Unavailable
        );
        // Failure dominates even at low depth; success at high depth degrades
        assert_eq!(
            compute_health(80, 50, Some(LastOutcome::Success)),
            Health::Degraded
        );
        assert_eq!(
            compute_health(10, 50, Some(LastOutcome::Success)),
            Health::Healthy
        );
        assert_eq!(compute_health(0, 50, None), Health::Healthy);
    }

    #[test]
    fn metrics_rolling_average() {
        let mut m = QueueMetrics::default();
        m.record(true, 100);
        m.record(true, 200);
        m.record(false, 300);
        assert_eq!(m.items_processed, 2);
        assert_eq!(m.items_failed, 1);
        assert!((m.avg_processing_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stopped_does_not_accept_work() {
        assert!(ProcessingStatus::Idle.accepts_work());
        assert!(ProcessingStatus::Active.accepts_work());
        assert!(!ProcessingStatus::Draining.accepts_work());
        assert!(!ProcessingStatus::Stopped.accepts_work());
    }
}
