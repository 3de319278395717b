// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod speech;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use speech::{SpeechError, SpeechProcessor};
pub use time_provider::TimeProvider;
