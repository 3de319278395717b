// Speech Processor Port
// Abstraction over the slow synthesis + playback collaborator

use crate::domain::NotificationRequest;
use async_trait::async_trait;
use thiserror::Error;

/// Errors a speech processor may report.
///
/// These are regular return values, never process-fatal: the worker loop
/// records them on the item and moves on.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Playback timeout after {0}ms")]
    Timeout(i64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Speech Processor trait
///
/// Invoked once per queue item by the single worker. Implementations must be
/// safe to call repeatedly in immediate succession.
///
/// Implementations:
/// - SubprocessSpeaker (infra-speech): spawns a platform TTS command
/// - mocks::MockSpeechProcessor: scripted behavior for tests
#[async_trait]
pub trait SpeechProcessor: Send + Sync {
    /// Synthesize and play one notification.
    ///
    /// Resolves once playback has finished (or failed). The queue imposes no
    /// timeout of its own; implementations define their own bounds.
    async fn speak(&self, request: &NotificationRequest) -> Result<(), SpeechError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Mock processor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Fail only on the nth call (1-based); succeed otherwise
        FailOn(usize, String),
        /// Succeed after a fixed delay
        Delay(Duration),
        /// Never resolve (for admission-ceiling and drain-timeout tests)
        Never,
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// One completed mock invocation, for FIFO and no-overlap assertions.
    #[derive(Debug, Clone)]
    pub struct SpokenCall {
        pub text: String,
        pub started_at: Instant,
        pub finished_at: Instant,
    }

    /// Mock Speech Processor for testing
    pub struct MockSpeechProcessor {
        behavior: Arc<Mutex<MockBehavior>>,
        started: Arc<Mutex<Vec<String>>>,
        calls: Arc<Mutex<Vec<SpokenCall>>>,
    }

    impl MockSpeechProcessor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                started: Arc::new(Mutex::new(Vec::new())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_fail_on(nth: usize, message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailOn(nth, message.into()))
        }

        pub fn new_delay(delay: Duration) -> Self {
            Self::new(MockBehavior::Delay(delay))
        }

        pub fn new_never_resolving() -> Self {
            Self::new(MockBehavior::Never)
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        /// Swap the scripted behavior mid-test (e.g. recover after failures).
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        /// Number of invocations that began (includes never-resolving ones).
        pub fn call_count(&self) -> usize {
            self.started.lock().unwrap().len()
        }

        /// Texts in the order invocations began.
        pub fn started_texts(&self) -> Vec<String> {
            self.started.lock().unwrap().clone()
        }

        /// Completed invocations, in completion order.
        pub fn completed_calls(&self) -> Vec<SpokenCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechProcessor for MockSpeechProcessor {
        async fn speak(&self, request: &NotificationRequest) -> Result<(), SpeechError> {
            let started_at = Instant::now();
            let call_index = {
                let mut started = self.started.lock().unwrap();
                started.push(request.text.clone());
                started.len()
            };

            let behavior = self.behavior.lock().unwrap().clone();

            let result = match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(SpeechError::SynthesisFailed(msg)),
                MockBehavior::FailOn(nth, msg) => {
                    if call_index == nth {
                        Err(SpeechError::SynthesisFailed(msg))
                    } else {
                        Ok(())
                    }
                }
                MockBehavior::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
                MockBehavior::Never => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            };

            self.calls.lock().unwrap().push(SpokenCall {
                text: request.text.clone(),
                started_at,
                finished_at: Instant::now(),
            });

            result
        }
    }
}
