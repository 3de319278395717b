// notifyd Speech Infrastructure - subprocess TTS adapter

pub mod speaker;
pub mod voices;

pub use speaker::{SpeakerConfig, SubprocessSpeaker};
pub use voices::VoiceCatalog;
