// Queue Configuration

use std::time::Duration;

/// Default hard admission ceiling
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default depth at which health degrades while still accepting work
pub const DEFAULT_DEGRADED_THRESHOLD: usize = 50;

/// Default maximum wait for the drain protocol (30s)
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Static queue tunables, immutable once the queue is constructed.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Hard admission ceiling; enqueue beyond this is rejected.
    pub max_depth: usize,
    /// Depth at which health reporting downgrades to Degraded.
    pub degraded_threshold: usize,
    /// Maximum time drain() waits for the queue to empty before giving up.
    pub drain_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            degraded_threshold: DEFAULT_DEGRADED_THRESHOLD,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl QueueConfig {
    pub fn new(max_depth: usize, degraded_threshold: usize, drain_timeout: Duration) -> Self {
        Self {
            max_depth,
            degraded_threshold,
            drain_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = QueueConfig::default();
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.degraded_threshold, 50);
        assert_eq!(config.drain_timeout, Duration::from_secs(30));
    }
}
