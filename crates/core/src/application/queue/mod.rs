// Notification Queue - admission control, single-worker processing, drain
//
// The only component in the system with real concurrency requirements. Many
// producers call enqueue() concurrently; exactly one worker task advances
// through the list, so items are processed strictly in arrival order and
// spoken audio never overlaps.

pub mod validate;


use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::domain::state::{compute_health, LastOutcome};
use crate::domain::{
    ItemId, NotificationRequest, ProcessingStatus, QueueConfig, QueueItem, QueueMetrics,
    QueueState,
};
use crate::port::{IdProvider, SpeechProcessor, TimeProvider};

/// Outcome of an admission attempt, mapped 1:1 onto the wire response.
#[derive(Debug, Clone, Serialize)]
pub struct EnqueueResult {
    pub accepted: bool,
    /// HTTP-equivalent code: 201 accepted, 400 invalid, 429 full, 503 not accepting.
    pub status_code: u16,
    pub message: String,
    pub item_id: Option<ItemId>,
    /// 1-based position at enqueue time. Informational only; not a
    /// reservation and not guaranteed stable.
    pub position: Option<usize>,
}

impl EnqueueResult {
    fn accepted(item_id: ItemId, position: usize) -> Self {
        Self {
            accepted: true,
            status_code: 201,
            message: "Notification queued".to_string(),
            item_id: Some(item_id),
            position: Some(position),
        }
    }

    fn rejected(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            status_code,
            message: message.into(),
            item_id: None,
            position: None,
        }
    }
}

/// Outcome of the drain protocol.
#[derive(Debug, Clone, Serialize)]
pub struct DrainResult {
    /// True when `drain_timeout` elapsed before the queue emptied. Best
    /// effort: the caller is expected to log this and exit anyway.
    pub timed_out: bool,
    /// Items completed during the drain window.
    pub items_processed: u64,
    /// Items failed during the drain window.
    pub items_failed: u64,
    /// Items still queued or in flight when drain resolved.
    pub remaining: usize,
}

/// Mutable queue state. Guarded by a single mutex; never held across the
/// processor await.
struct QueueCore {
    items: VecDeque<QueueItem>,
    status: ProcessingStatus,
    metrics: QueueMetrics,
    last_outcome: Option<LastOutcome>,
    /// Guard flag: only one logical worker is ever active.
    worker_running: bool,
}

struct Inner {
    config: QueueConfig,
    processor: Arc<dyn SpeechProcessor>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    core: Mutex<QueueCore>,
    /// Live depth signal; drain() waits on this instead of busy polling.
    depth_tx: watch::Sender<usize>,
}

/// Admission-controlled, single-consumer FIFO queue for spoken notifications.
///
/// Cheap to clone; all clones share the same queue.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl NotificationQueue {
    pub fn new(
        config: QueueConfig,
        processor: Arc<dyn SpeechProcessor>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        let (depth_tx, _) = watch::channel(0usize);
        Self {
            inner: Arc::new(Inner {
                config,
                processor,
                time_provider,
                id_provider,
                core: Mutex::new(QueueCore {
                    items: VecDeque::new(),
                    status: ProcessingStatus::Idle,
                    metrics: QueueMetrics::default(),
                    last_outcome: None,
                    worker_running: false,
                }),
                depth_tx,
            }),
        }
    }

    /// Admit a notification, or reject it with an HTTP-equivalent code.
    ///
    /// Rejection checks short-circuit in a fixed order: draining/stopped
    /// (503), structural validation (400), capacity (429). Validation runs
    /// before the depth check so invalid requests never count against
    /// capacity. Returns as soon as the item is appended; processing happens
    /// on the background worker.
    pub async fn enqueue(&self, request: NotificationRequest) -> EnqueueResult {
        let mut core = self.inner.core.lock().await;

        if !core.status.accepts_work() {
            return EnqueueResult::rejected(
                503,
                format!("Queue is {}, not accepting new items", core.status),
            );
        }

        if let Err(e) = validate::validate_request(&request) {
            return EnqueueResult::rejected(400, e.to_string());
        }

        if core.items.len() >= self.inner.config.max_depth {
            return EnqueueResult::rejected(
                429,
                format!("Queue is full (max depth {})", self.inner.config.max_depth),
            );
        }

        let item_id = self.inner.id_provider.generate_id();
        let arrived_at = self.inner.time_provider.now_millis();
        let item = QueueItem::new(item_id.clone(), arrived_at, request);
        core.items.push_back(item);
        let position = core.items.len();
        self.inner.depth_tx.send_replace(position);

        // Idempotent worker trigger: the flag is checked under the same lock
        // as the append, so a worker that is draining its final item either
        // sees the new item or has already cleared the flag.
        if !core.worker_running {
            core.worker_running = true;
            core.status = ProcessingStatus::Active;
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                run_worker(inner).await;
            });
        }

        info!(item_id = %item_id, position = position, "Notification admitted");
        EnqueueResult::accepted(item_id, position)
    }

    /// Side-effect-free snapshot of depth, status, health, and metrics.
    ///
    /// Never errors: an unhealthy processor is reported in the `health`
    /// field, not via a failure.
    pub async fn state(&self) -> QueueState {
        let core = self.inner.core.lock().await;
        QueueState {
            depth: core.items.len(),
            processing_status: core.status,
            health: compute_health(
                core.items.len(),
                self.inner.config.degraded_threshold,
                core.last_outcome,
            ),
            metrics: core.metrics.clone(),
        }
    }

    /// Current number of queued or in-flight items.
    pub async fn depth(&self) -> usize {
        self.inner.core.lock().await.items.len()
    }

    /// Stop admitting new items and wait for existing work to finish,
    /// bounded by `drain_timeout`.
    ///
    /// Idempotent: concurrent callers attach to the same wait. After drain
    /// resolves (empty or timeout) the queue is permanently Stopped.
    pub async fn drain(&self) -> DrainResult {
        let (processed_before, failed_before) = {
            let mut core = self.inner.core.lock().await;
            if core.status == ProcessingStatus::Stopped {
                return DrainResult {
                    timed_out: false,
                    items_processed: 0,
                    items_failed: 0,
                    remaining: core.items.len(),
                };
            }
            if core.status != ProcessingStatus::Draining {
                info!(depth = core.items.len(), "Draining notification queue");
                core.status = ProcessingStatus::Draining;
            }
            (core.metrics.items_processed, core.metrics.items_failed)
        };

        let mut depth_rx = self.inner.depth_tx.subscribe();
        // The value guard from wait_for must not outlive this expression:
        // holding it while taking the core lock could deadlock the worker's
        // depth publication.
        let timed_out = tokio::time::timeout(
            self.inner.config.drain_timeout,
            depth_rx.wait_for(|depth| *depth == 0),
        )
        .await
        .is_err();

        let mut core = self.inner.core.lock().await;
        core.status = ProcessingStatus::Stopped;
        let remaining = core.items.len();
        let result = DrainResult {
            timed_out,
            items_processed: core.metrics.items_processed - processed_before,
            items_failed: core.metrics.items_failed - failed_before,
            remaining,
        };

        if result.timed_out {
            warn!(
                remaining = remaining,
                timeout_ms = self.inner.config.drain_timeout.as_millis() as u64,
                "Drain timed out with items remaining"
            );
        } else {
            info!(
                items_processed = result.items_processed,
                items_failed = result.items_failed,
                "Drain complete"
            );
        }
        result
    }

    /// Immediate halt for forced teardown: sets Stopped without waiting for
    /// in-flight work. Queued items are abandoned.
    pub async fn stop(&self) {
        let mut core = self.inner.core.lock().await;
        if core.status != ProcessingStatus::Stopped {
            info!(depth = core.items.len(), "Queue stopped");
            core.status = ProcessingStatus::Stopped;
        }
    }
}

/// What the worker found at the head of the queue.
enum Step {
    Claimed(ItemId, Arc<NotificationRequest>),
    Exit,
}

/// The single worker loop.
///
/// Exactly one instance runs at a time, guarded by `worker_running`. Each
/// iteration claims the head item, invokes the processor with the lock
/// released, then records the outcome and removes the head. Item N+1 is
/// never started before item N reaches a terminal state.
async fn run_worker(inner: Arc<Inner>) {
    loop {
        let step = {
            let mut guard = inner.core.lock().await;
            let core = &mut *guard;
            if core.status == ProcessingStatus::Stopped {
                core.worker_running = false;
                Step::Exit
            } else {
                match core.items.front_mut() {
                    Some(head) => {
                        let now = inner.time_provider.now_millis();
                        match head.start(now) {
                            Ok(()) => {
                                Step::Claimed(head.id.clone(), Arc::new(head.payload.clone()))
                            }
                            Err(e) => {
                                // Unreachable with a single worker; drop the
                                // item rather than wedge the loop.
                                error!(item_id = %head.id, error = %e, "Head item in unexpected state");
                                core.items.pop_front();
                                inner.depth_tx.send_replace(core.items.len());
                                continue;
                            }
                        }
                    }
                    None => {
                        if core.status == ProcessingStatus::Active {
                            core.status = ProcessingStatus::Idle;
                        }
                        core.worker_running = false;
                        Step::Exit
                    }
                }
            }
        };

        let (item_id, payload) = match step {
            Step::Claimed(id, payload) => (id, payload),
            Step::Exit => break,
        };

        info!(item_id = %item_id, "Speaking notification");

        // Spawn the processor call so a panic is contained: it surfaces as a
        // JoinError and becomes a recorded item failure, never a dead worker.
        let processor = Arc::clone(&inner.processor);
        let request = Arc::clone(&payload);
        let handle = tokio::spawn(async move { processor.speak(&request).await });
        let outcome = handle.await;

        let mut guard = inner.core.lock().await;
        let core = &mut *guard;
        let now = inner.time_provider.now_millis();
        if let Some(head) = core.items.front_mut() {
            let duration_ms = now - head.processing_started_at.unwrap_or(now);
            match outcome {
                Ok(Ok(())) => {
                    if let Err(e) = head.complete(now) {
                        error!(item_id = %head.id, error = %e, "Completion transition rejected");
                    }
                    core.metrics.record(true, duration_ms);
                    core.last_outcome = Some(LastOutcome::Success);
                    info!(item_id = %item_id, duration_ms = duration_ms, "Notification spoken");
                }
                Ok(Err(e)) => {
                    head.fail(now, e.to_string());
                    core.metrics.record(false, duration_ms);
                    core.last_outcome = Some(LastOutcome::Failure);
                    error!(item_id = %item_id, error = %e, "Speech processing failed");
                }
                Err(join_err) => {
                    let reason = if join_err.is_panic() {
                        format!("Processor panicked: {}", join_err)
                    } else {
                        format!("Processor task cancelled: {}", join_err)
                    };
                    head.fail(now, reason.clone());
                    core.metrics.record(false, duration_ms);
                    core.last_outcome = Some(LastOutcome::Failure);
                    error!(item_id = %item_id, error = %reason, "Speech processing aborted");
                }
            }
            // Items are destroyed the instant they reach a terminal state;
            // there is no archive and no dead-letter store.
            core.items.pop_front();
            inner.depth_tx.send_replace(core.items.len());
        }
    }
}
