// Domain Layer - Pure queue entities and derived state

pub mod config;
pub mod error;
pub mod item;
pub mod state;

// Re-exports
pub use config::QueueConfig;
pub use error::DomainError;
pub use item::{ItemId, ItemStatus, NotificationRequest, QueueItem};
pub use state::{Health, ProcessingStatus, QueueMetrics, QueueState};
