//! Ordering, admission, and failure-isolation properties of the queue.

use std::sync::Arc;
use std::time::Duration;

use notifyd_core::domain::{NotificationRequest, QueueConfig};
use notifyd_core::port::id_provider::UuidProvider;
use notifyd_core::port::speech::mocks::MockSpeechProcessor;
use notifyd_core::port::time_provider::SystemTimeProvider;
use notifyd_core::NotificationQueue;

fn make_queue(config: QueueConfig, processor: Arc<MockSpeechProcessor>) -> NotificationQueue {
    NotificationQueue::new(
        config,
        processor,
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    )
}

async fn wait_until_empty(queue: &NotificationQueue) {
    for _ in 0..400 {
        if queue.depth().await == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("queue did not empty in time");
}

/// The processor is invoked in exactly the order of successful enqueues.
#[tokio::test]
async fn fifo_invariant() {
    let processor = Arc::new(MockSpeechProcessor::new_delay(Duration::from_millis(10)));
    let queue = make_queue(QueueConfig::default(), processor.clone());

    let expected: Vec<String> = (0..8).map(|i| format!("notification {}", i)).collect();
    for text in &expected {
        let result = queue.enqueue(NotificationRequest::text_only(text)).await;
        assert!(result.accepted, "enqueue of {:?} was rejected", text);
    }

    wait_until_empty(&queue).await;
    assert_eq!(processor.started_texts(), expected);
}

/// Item N+1 never starts before item N has reached a terminal state.
#[tokio::test]
async fn no_overlapping_playback() {
    let processor = Arc::new(MockSpeechProcessor::new_delay(Duration::from_millis(20)));
    let queue = make_queue(QueueConfig::default(), processor.clone());

    for text in ["a", "b", "c"] {
        assert!(queue.enqueue(NotificationRequest::text_only(text)).await.accepted);
    }
    wait_until_empty(&queue).await;

    let calls = processor.completed_calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(
            pair[1].started_at >= pair[0].finished_at,
            "{:?} started before {:?} finished",
            pair[1].text,
            pair[0].text
        );
    }
}

/// Concurrent producers: every admitted item is spoken exactly once.
#[tokio::test]
async fn concurrent_producers_lose_nothing() {
    let processor = Arc::new(MockSpeechProcessor::new_success());
    let queue = make_queue(QueueConfig::default(), processor.clone());

    let mut handles = Vec::new();
    for producer in 0..10 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            let mut accepted = 0;
            for i in 0..5 {
                let text = format!("p{} n{}", producer, i);
                if queue.enqueue(NotificationRequest::text_only(text)).await.accepted {
                    accepted += 1;
                }
            }
            accepted
        }));
    }

    let mut total_accepted = 0;
    for handle in handles {
        total_accepted += handle.await.expect("producer task");
    }
    assert_eq!(total_accepted, 50);

    wait_until_empty(&queue).await;
    assert_eq!(processor.call_count(), 50);
    let state = queue.state().await;
    assert_eq!(state.metrics.items_processed, 50);
    assert_eq!(state.metrics.items_failed, 0);
}

/// max_depth + 1 enqueues against a stuck processor: exactly one 429,
/// and depth never exceeds max_depth.
#[tokio::test]
async fn admission_ceiling() {
    let max_depth = 5;
    let config = QueueConfig::new(max_depth, 50, Duration::from_secs(1));
    let processor = Arc::new(MockSpeechProcessor::new_never_resolving());
    let queue = make_queue(config, processor);

    let mut rejections = 0;
    for i in 0..=max_depth {
        let result = queue
            .enqueue(NotificationRequest::text_only(format!("item {}", i)))
            .await;
        if !result.accepted {
            assert_eq!(result.status_code, 429);
            rejections += 1;
        }
        assert!(queue.depth().await <= max_depth);
    }
    assert_eq!(rejections, 1);
}

/// Validation precedes the capacity check: invalid requests get 400 even
/// when the queue is full, and are never counted against capacity.
#[tokio::test]
async fn invalid_rejected_before_full() {
    let config = QueueConfig::new(2, 50, Duration::from_secs(1));
    let processor = Arc::new(MockSpeechProcessor::new_never_resolving());
    let queue = make_queue(config, processor);

    assert!(queue.enqueue(NotificationRequest::text_only("one")).await.accepted);
    assert!(queue.enqueue(NotificationRequest::text_only("two")).await.accepted);

    let invalid = queue.enqueue(NotificationRequest::text_only("  ")).await;
    assert_eq!(invalid.status_code, 400);

    let oversized = queue
        .enqueue(NotificationRequest::text_only("x".repeat(10_000)))
        .await;
    assert_eq!(oversized.status_code, 400);

    assert_eq!(queue.depth().await, 2);
}

/// A processor failure on the 2nd of 3 items does not stop the loop and
/// does not prevent the surviving items from reaching the processor.
#[tokio::test]
async fn failure_isolation() {
    let processor = Arc::new(MockSpeechProcessor::new_fail_on(2, "synthesis refused"));
    let queue = make_queue(QueueConfig::default(), processor.clone());

    for text in ["first", "second", "third"] {
        assert!(queue.enqueue(NotificationRequest::text_only(text)).await.accepted);
    }
    wait_until_empty(&queue).await;

    let state = queue.state().await;
    assert_eq!(state.metrics.items_processed, 2);
    assert_eq!(state.metrics.items_failed, 1);

    let texts = processor.started_texts();
    assert!(texts.contains(&"first".to_string()));
    assert!(texts.contains(&"third".to_string()));
}
