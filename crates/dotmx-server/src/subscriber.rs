use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

/// Outbound queue depth. Once full, the dispatcher treats the subscriber
/// as slow and evicts it rather than waiting.
pub const QUEUE_CAPACITY: usize = 16;

pub type SubscriberId = String;

/// One connected client's fan-out state.
///
/// The registry and the dispatcher only ever see this behind an `Arc`, so
/// fan-out can iterate a snapshot of handles without holding the registry
/// lock across any network operation.
pub struct SubscriberHandle {
    id: SubscriberId,
    outbound: mpsc::Sender<Vec<u8>>,
    closed: AtomicBool,
}

impl SubscriberHandle {
    fn new(id: SubscriberId, outbound: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            id,
            outbound,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Non-blocking enqueue. Returns `false` if the queue was full or the
    /// subscriber's write task has already gone away, either of which means
    /// the caller should evict this subscriber.
    pub fn try_send(&self, message: Vec<u8>) -> bool {
        if self.is_closed() {
            return false;
        }
        self.outbound.try_send(message).is_ok()
    }
}

/// Tracks every connected subscriber under one exclusive lock.
///
/// Registration and eviction happen under the lock; fan-out reads a
/// cloned `Vec<Arc<SubscriberHandle>>` snapshot instead, accepting that a
/// just-evicted subscriber shows up as one benign closed-queue send
/// failure on the frame after its removal.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<SubscriberId, Arc<SubscriberHandle>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its handle plus the receiving
    /// half of its outbound queue, which the caller hands to a write task.
    pub fn register(&self, id: SubscriberId) -> (Arc<SubscriberHandle>, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = Arc::new(SubscriberHandle::new(id.clone(), tx));
        self.subscribers.write().insert(id, handle.clone());
        (handle, rx)
    }

    /// Idempotent: evicting an id that is no longer present is a no-op.
    pub fn evict(&self, id: &str) {
        if let Some(handle) = self.subscribers.write().remove(id) {
            handle.mark_closed();
        }
    }

    /// A point-in-time snapshot of connected handles, safe to iterate
    /// without holding the registry lock.
    pub fn snapshot(&self) -> Vec<Arc<SubscriberHandle>> {
        self.subscribers.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (_handle, _rx) = registry.register("a".to_owned());
        assert_eq!(registry.len(), 1);

        registry.evict("a");
        registry.evict("a");
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn full_queue_reports_send_failure() {
        let registry = SubscriberRegistry::new();
        let (handle, _rx) = registry.register("a".to_owned());

        for _ in 0..QUEUE_CAPACITY {
            assert!(handle.try_send(vec![0xFB]));
        }
        assert!(!handle.try_send(vec![0xFB]));
    }
}
