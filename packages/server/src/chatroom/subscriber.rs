//! Subscriber Channel: a bounded, non-blocking per-connection frame queue.
//!
//! The producing half ([`Subscriber`]) is owned by a room's event loop and
//! never blocks: when the queue is full the configured [`OverflowPolicy`]
//! decides which frame is lost. The consuming half ([`SubscriberReceiver`]) is
//! owned by exactly one connection's writer and suspends until a frame is
//! available or the producer is gone.

use std::{
    collections::VecDeque,
    fmt,
    num::NonZeroUsize,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

/// Default number of frames a subscriber may have pending
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 100;

/// What to do with a frame that arrives while the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OverflowPolicy {
    /// Reject the incoming frame, keeping what is already queued
    #[default]
    DropNewest,
    /// Evict the oldest queued frame to admit the incoming one
    DropOldest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => f.write_str("drop-newest"),
            OverflowPolicy::DropOldest => f.write_str("drop-oldest"),
        }
    }
}

/// Capacity and overflow policy applied to every subscriber of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberConfig {
    capacity: NonZeroUsize,
    overflow: OverflowPolicy,
}

impl SubscriberConfig {
    pub fn new(capacity: NonZeroUsize, overflow: OverflowPolicy) -> Self {
        Self { capacity, overflow }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_SUBSCRIBER_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            overflow: OverflowPolicy::default(),
        }
    }
}

/// Unique identifier of one subscription (one streaming connection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Successful enqueue outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The frame was queued without losing anything
    Queued,
    /// The frame was queued after evicting the oldest pending frame
    EvictedOldest,
}

/// Why a frame was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The queue is full and the incoming frame was dropped
    #[error("subscriber queue is full, frame dropped")]
    Full,

    /// The consuming connection has gone away
    #[error("subscriber has disconnected")]
    Disconnected,
}

#[derive(Debug, Default)]
struct Queue {
    frames: VecDeque<String>,
    sender_closed: bool,
    receiver_closed: bool,
}

#[derive(Debug)]
struct Shared {
    queue: Mutex<Queue>,
    notify: Notify,
    dropped: AtomicU64,
}

impl Shared {
    // The queue is only touched in short non-panicking sections, so a
    // poisoned lock still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a connected subscriber pair.
pub fn channel(config: SubscriberConfig) -> (Subscriber, SubscriberReceiver) {
    let id = SubscriberId::generate();
    let shared = Arc::new(Shared {
        queue: Mutex::new(Queue {
            frames: VecDeque::with_capacity(config.capacity()),
            ..Queue::default()
        }),
        notify: Notify::new(),
        dropped: AtomicU64::new(0),
    });
    (
        Subscriber {
            id,
            config,
            shared: shared.clone(),
        },
        SubscriberReceiver { id, shared },
    )
}

/// Producer half, held by the room
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    config: SubscriberConfig,
    shared: Arc<Shared>,
}

impl Subscriber {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queue `frame` without blocking.
    pub fn enqueue(&self, frame: String) -> Result<Enqueued, EnqueueError> {
        let mut queue = self.shared.lock();
        if queue.receiver_closed {
            return Err(EnqueueError::Disconnected);
        }

        let outcome = if queue.frames.len() >= self.config.capacity() {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            match self.config.overflow() {
                OverflowPolicy::DropNewest => return Err(EnqueueError::Full),
                OverflowPolicy::DropOldest => {
                    queue.frames.pop_front();
                    Enqueued::EvictedOldest
                }
            }
        } else {
            Enqueued::Queued
        };

        queue.frames.push_back(frame);
        drop(queue);
        self.shared.notify.notify_one();
        Ok(outcome)
    }

    /// Number of frames waiting to be written
    pub fn pending(&self) -> usize {
        self.shared.lock().frames.len()
    }

    /// Number of frames lost to the overflow policy so far
    pub fn dropped_frames(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    pub fn is_disconnected(&self) -> bool {
        self.shared.lock().receiver_closed
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.shared.lock().sender_closed = true;
        self.shared.notify.notify_one();
    }
}

/// Consumer half, drained by one connection's writer
#[derive(Debug)]
pub struct SubscriberReceiver {
    id: SubscriberId,
    shared: Arc<Shared>,
}

impl SubscriberReceiver {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next frame.
    ///
    /// Returns `None` once the room has released the subscriber and every
    /// pending frame has been handed out. Cancel safe: dropping the future
    /// never loses a frame.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            if let Some(next) = self.poll_queue() {
                return next;
            }
            self.shared.notify.notified().await;
        }
    }

    /// Take the next frame if one is pending.
    pub fn try_recv(&mut self) -> Option<String> {
        self.shared.lock().frames.pop_front()
    }

    /// `Some(frame)`, `Some(None)` when closed and drained, `None` when empty.
    fn poll_queue(&self) -> Option<Option<String>> {
        let mut queue = self.shared.lock();
        match queue.frames.pop_front() {
            Some(frame) => Some(Some(frame)),
            None if queue.sender_closed => Some(None),
            None => None,
        }
    }
}

impl Drop for SubscriberReceiver {
    fn drop(&mut self) {
        let mut queue = self.shared.lock();
        queue.receiver_closed = true;
        queue.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(capacity: usize, overflow: OverflowPolicy) -> SubscriberConfig {
        SubscriberConfig::new(NonZeroUsize::new(capacity).unwrap(), overflow)
    }

    #[tokio::test]
    async fn test_frames_are_delivered_in_order() {
        // テスト項目: キューに入れた順番でフレームが取り出される
        // given (前提条件):
        let (subscriber, mut receiver) = channel(config(10, OverflowPolicy::DropNewest));

        // when (操作):
        subscriber.enqueue("one\n".to_string()).unwrap();
        subscriber.enqueue("two\n".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(receiver.recv().await, Some("one\n".to_string()));
        assert_eq!(receiver.recv().await, Some("two\n".to_string()));
    }

    #[test]
    fn test_drop_newest_rejects_frame_when_full() {
        // テスト項目: drop-newest ではキューが満杯の時に新しいフレームが破棄される
        // given (前提条件):
        let (subscriber, mut receiver) = channel(config(2, OverflowPolicy::DropNewest));
        subscriber.enqueue("1".to_string()).unwrap();
        subscriber.enqueue("2".to_string()).unwrap();

        // when (操作):
        let result = subscriber.enqueue("3".to_string());

        // then (期待する結果):
        assert_eq!(result, Err(EnqueueError::Full));
        assert_eq!(subscriber.dropped_frames(), 1);
        assert_eq!(receiver.try_recv(), Some("1".to_string()));
        assert_eq!(receiver.try_recv(), Some("2".to_string()));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_drop_oldest_evicts_head_when_full() {
        // テスト項目: drop-oldest ではキューが満杯の時に最も古いフレームが追い出される
        // given (前提条件):
        let (subscriber, mut receiver) = channel(config(2, OverflowPolicy::DropOldest));
        subscriber.enqueue("1".to_string()).unwrap();
        subscriber.enqueue("2".to_string()).unwrap();

        // when (操作):
        let result = subscriber.enqueue("3".to_string());

        // then (期待する結果):
        assert_eq!(result, Ok(Enqueued::EvictedOldest));
        assert_eq!(subscriber.dropped_frames(), 1);
        assert_eq!(subscriber.pending(), 2);
        assert_eq!(receiver.try_recv(), Some("2".to_string()));
        assert_eq!(receiver.try_recv(), Some("3".to_string()));
    }

    #[test]
    fn test_enqueue_after_receiver_dropped_reports_disconnected() {
        // テスト項目: 受信側が切断された後の送信は Disconnected になる
        // given (前提条件):
        let (subscriber, receiver) = channel(config(2, OverflowPolicy::DropNewest));
        drop(receiver);

        // when (操作):
        let result = subscriber.enqueue("late".to_string());

        // then (期待する結果):
        assert_eq!(result, Err(EnqueueError::Disconnected));
        assert!(subscriber.is_disconnected());
    }

    #[tokio::test]
    async fn test_recv_drains_pending_frames_then_closes() {
        // テスト項目: 送信側が解放されても未読フレームを読み切ってから None を返す
        // given (前提条件):
        let (subscriber, mut receiver) = channel(config(4, OverflowPolicy::DropNewest));
        subscriber.enqueue("last words\n".to_string()).unwrap();

        // when (操作):
        drop(subscriber);

        // then (期待する結果):
        assert_eq!(receiver.recv().await, Some("last words\n".to_string()));
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_recv_wakes_up_when_frame_arrives() {
        // テスト項目: 待機中の受信側がフレーム到着で起床する
        // given (前提条件):
        let (subscriber, mut receiver) = channel(config(4, OverflowPolicy::DropNewest));
        let waiter = tokio::spawn(async move { receiver.recv().await });

        // when (操作):
        tokio::time::sleep(Duration::from_millis(20)).await;
        subscriber.enqueue("wake\n".to_string()).unwrap();

        // then (期待する結果):
        let received = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("receiver should wake up")
            .unwrap();
        assert_eq!(received, Some("wake\n".to_string()));
    }

    #[tokio::test]
    async fn test_recv_wakes_up_when_sender_dropped() {
        // テスト項目: 待機中の受信側が送信側の解放で None を受け取る
        // given (前提条件):
        let (subscriber, mut receiver) = channel(config(4, OverflowPolicy::DropNewest));
        let waiter = tokio::spawn(async move { receiver.recv().await });

        // when (操作):
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(subscriber);

        // then (期待する結果):
        let received = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("receiver should observe close")
            .unwrap();
        assert_eq!(received, None);
    }

    #[test]
    fn test_default_config() {
        // テスト項目: デフォルト設定は容量 100・drop-newest
        // given (前提条件):

        // when (操作):
        let config = SubscriberConfig::default();

        // then (期待する結果):
        assert_eq!(config.capacity(), DEFAULT_SUBSCRIBER_CAPACITY);
        assert_eq!(config.overflow(), OverflowPolicy::DropNewest);
    }
}
