use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

pub const REVIEWS_TABLE: &str = "reviews";
pub const SENTIMENT_TABLE: &str = "sentiment_analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            table: table.into(),
            kind,
        }
    }
}

#[derive(Clone)]
pub struct RealtimeHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>>,
    capacity: usize,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<ChangeEvent>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, table: &str) -> Subscription {
        let mut channels = self.lock();
        let sender = channels
            .entry(table.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Subscription {
            table: table.to_string(),
            receiver: sender.subscribe(),
        }
    }

    pub fn publish(&self, event: ChangeEvent) {
        if let Some(sender) = self.lock().get(&event.table) {
            // No subscribers is not an error.
            let _ = sender.send(event);
        }
    }

    pub fn subscriber_count(&self, table: &str) -> usize {
        self.lock()
            .get(table)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new(64)
    }
}

pub struct Subscription {
    table: String,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(table = %self.table, skipped, "subscription lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_events_to_subscribers() {
        let hub = RealtimeHub::default();
        let mut subscription = hub.subscribe(REVIEWS_TABLE);

        hub.publish(ChangeEvent::new(REVIEWS_TABLE, ChangeKind::Insert));

        let event = subscription.recv().await.unwrap();
        assert_eq!(event.table, REVIEWS_TABLE);
        assert_eq!(event.kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn tables_are_isolated() {
        let hub = RealtimeHub::default();
        let mut reviews = hub.subscribe(REVIEWS_TABLE);
        let _sentiment = hub.subscribe(SENTIMENT_TABLE);

        hub.publish(ChangeEvent::new(SENTIMENT_TABLE, ChangeKind::Update));
        assert!(reviews.try_recv().is_none());
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let hub = RealtimeHub::default();
        hub.publish(ChangeEvent::new(REVIEWS_TABLE, ChangeKind::Delete));
        assert_eq!(hub.subscriber_count(REVIEWS_TABLE), 0);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let hub = RealtimeHub::default();
        let subscription = hub.subscribe(REVIEWS_TABLE);
        assert_eq!(hub.subscriber_count(REVIEWS_TABLE), 1);

        drop(subscription);
        assert_eq!(hub.subscriber_count(REVIEWS_TABLE), 0);
    }
}
