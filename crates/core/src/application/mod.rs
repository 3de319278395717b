// Application Layer - Queue orchestration

pub mod queue;

pub use queue::{DrainResult, EnqueueResult, NotificationQueue};
