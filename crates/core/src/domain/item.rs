// Queue Item Domain Model

use serde::{Deserialize, Serialize};

/// Item ID (UUID v4), used for logging and tracing only.
/// The queue is accessed positionally, never by ID lookup.
pub type ItemId = String;

/// Lifecycle state of a queue item.
///
/// Strictly monotonic: Pending -> Processing -> {Completed | Failed}.
/// No item ever revisits an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "PENDING"),
            ItemStatus::Processing => write!(f, "PROCESSING"),
            ItemStatus::Completed => write!(f, "COMPLETED"),
            ItemStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// A validated notification request: the payload carried by a queue item.
///
/// Opaque to the queue itself; only the speech processor interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Text to be spoken.
    pub text: String,
    /// Voice selector (friendly name). Unrecognized voices fall through to
    /// the processor default; legality is not the queue's concern.
    #[serde(default)]
    pub voice: Option<String>,
    /// Playback volume, 0.0..=1.0.
    #[serde(default)]
    pub volume: Option<f64>,
    /// Speaking-rate multiplier, 0.5..=2.0.
    #[serde(default)]
    pub rate: Option<f64>,
    /// Pitch multiplier, 0.5..=2.0.
    #[serde(default)]
    pub pitch: Option<f64>,
}

impl NotificationRequest {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            volume: None,
            rate: None,
            pitch: None,
        }
    }
}

/// One admitted notification awaiting or undergoing processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: ItemId,
    pub payload: NotificationRequest,
    pub status: ItemStatus,

    /// Set at admission; used for ordering verification and diagnostics,
    /// never for scheduling (ordering is by queue position).
    pub arrived_at: i64, // epoch ms
    pub processing_started_at: Option<i64>,
    pub completed_at: Option<i64>,

    /// Populated only when status is Failed.
    pub error: Option<String>,
}

impl QueueItem {
    /// Create a new item in Pending state.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique item ID (injected, not generated)
    /// * `arrived_at` - Admission timestamp in epoch ms (injected, not system time)
    /// * `payload` - The validated notification request
    pub fn new(id: impl Into<String>, arrived_at: i64, payload: NotificationRequest) -> Self {
        Self {
            id: id.into(),
            payload,
            status: ItemStatus::Pending,
            arrived_at,
            processing_started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// Transition to Processing with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != ItemStatus::Pending {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: "PROCESSING".to_string(),
            });
        }
        self.status = ItemStatus::Processing;
        self.processing_started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Completed with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != ItemStatus::Processing {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: "COMPLETED".to_string(),
            });
        }
        self.status = ItemStatus::Completed;
        self.completed_at = Some(now_millis);
        Ok(())
    }

    /// Mark as Failed, recording the processing error
    pub fn fail(&mut self, now_millis: i64, error: impl Into<String>) {
        self.status = ItemStatus::Failed;
        self.completed_at = Some(now_millis);
        self.error = Some(error.into());
    }

    /// True once the item has reached Completed or Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ItemStatus::Completed | ItemStatus::Failed)
    }
}
