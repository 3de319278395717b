// Time Provider Port

/// Clock interface (allows frozen clocks in tests).
///
/// Supplies the arrival/started/completed timestamps stamped onto queue
/// items; the queue never reads system time directly.
pub trait TimeProvider: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System clock (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
