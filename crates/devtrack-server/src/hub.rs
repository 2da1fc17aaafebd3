//! Broadcast hub.
//!
//! The hub owns the set of connected subscribers. Each subscriber gets its
//! own bounded queue, so publish order is preserved per subscriber and a
//! slow or dead subscriber never blocks the others:
//!
//! - a full queue drops the event for that subscriber only
//! - a closed queue removes the subscriber from the set
//!
//! A subscriber sees only events published after `subscribe` returned.

use std::collections::HashMap;
use std::sync::Arc;

use devtrack_core::EngineStatistics;
use devtrack_protocol::StreamEvent;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique identity of a registered subscriber.
pub type SubscriberId = Uuid;

/// Receiving end handed to a subscriber on registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<StreamEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event. `None` once the hub dropped this subscriber.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<StreamEvent, TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Fan-out point for stream events.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<StreamEvent>>>,
    buffer: usize,
    stats: Arc<EngineStatistics>,
}

impl BroadcastHub {
    /// Create a hub whose subscribers each queue up to `buffer` events.
    pub fn new(buffer: usize, stats: Arc<EngineStatistics>) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
            stats,
        }
    }

    /// Register a new subscriber.
    pub async fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, tx);
        self.stats.set_subscribers(subscribers.len());
        debug!(subscriber = %id, total = subscribers.len(), "Subscriber registered");

        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write().await;
        let removed = subscribers.remove(&id).is_some();
        self.stats.set_subscribers(subscribers.len());
        if removed {
            debug!(subscriber = %id, total = subscribers.len(), "Subscriber removed");
        }
        removed
    }

    /// Deliver an event to every registered subscriber.
    ///
    /// Never waits on a subscriber. Returns how many subscribers accepted it.
    pub async fn publish(&self, event: StreamEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                match tx.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(subscriber = %id, kind = event.kind(), "Subscriber queue full, dropping event");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in closed {
                subscribers.remove(&id);
                debug!(subscriber = %id, "Dropped closed subscriber");
            }
            self.stats.set_subscribers(subscribers.len());
        }

        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(buffer: usize) -> BroadcastHub {
        BroadcastHub::new(buffer, Arc::new(EngineStatistics::new()))
    }

    fn drain(sub: &mut Subscription) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = sub.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_every_event_in_order() {
        let hub = hub(16);
        let mut a = hub.subscribe().await;
        let mut b = hub.subscribe().await;

        for i in 0..5 {
            assert_eq!(hub.publish(StreamEvent::status(format!("s{i}"))).await, 2);
        }

        let expected: Vec<StreamEvent> = (0..5).map(|i| StreamEvent::status(format!("s{i}"))).collect();
        assert_eq!(drain(&mut a), expected);
        assert_eq!(drain(&mut b), expected);
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscriber() {
        let hub = hub(16);
        hub.publish(StreamEvent::status("before")).await;

        let mut late = hub.subscribe().await;
        hub.publish(StreamEvent::status("after")).await;

        assert_eq!(drain(&mut late), vec![StreamEvent::status("after")]);
    }

    #[tokio::test]
    async fn test_unsubscribed_receives_nothing_more() {
        let hub = hub(16);
        let mut sub = hub.subscribe().await;
        let mut other = hub.subscribe().await;

        assert!(hub.unsubscribe(sub.id()).await);
        assert!(!hub.unsubscribe(sub.id()).await);

        assert_eq!(hub.publish(StreamEvent::status("x")).await, 1);
        assert!(drain(&mut sub).is_empty());
        assert_eq!(drain(&mut other).len(), 1);
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_removed() {
        let stats = Arc::new(EngineStatistics::new());
        let hub = BroadcastHub::new(16, stats.clone());
        let dropped = hub.subscribe().await;
        let mut alive = hub.subscribe().await;
        assert_eq!(stats.snapshot().subscribers, 2);

        drop(dropped);
        assert_eq!(hub.publish(StreamEvent::status("x")).await, 1);

        assert_eq!(hub.subscriber_count().await, 1);
        assert_eq!(stats.snapshot().subscribers, 1);
        assert_eq!(drain(&mut alive), vec![StreamEvent::status("x")]);
    }

    #[tokio::test]
    async fn test_full_subscriber_does_not_block_others() {
        let hub = hub(2);
        let mut slow = hub.subscribe().await;
        let mut fast = hub.subscribe().await;

        for i in 0..3 {
            hub.publish(StreamEvent::status(format!("s{i}"))).await;
            // fast keeps up, slow never reads until the end
            assert_eq!(fast.try_recv().unwrap(), StreamEvent::status(format!("s{i}")));
        }

        assert_eq!(
            drain(&mut slow),
            vec![StreamEvent::status("s0"), StreamEvent::status("s1")]
        );
        assert_eq!(hub.subscriber_count().await, 2);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = hub(4);
        assert_eq!(hub.publish(StreamEvent::error("nobody listening")).await, 0);
    }
}
