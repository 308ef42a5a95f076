// ws/mod.rs
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

use crate::models::ordermodels::OrderKind;

pub mod chat_socket;
pub mod contract_socket;

pub fn chat_topic(conversation_id: Uuid) -> String {
    format!("chat:{}", conversation_id)
}

pub fn contract_topic(kind: OrderKind, order_id: Uuid) -> String {
    format!("contracts:{}:{}", kind, order_id)
}

/// Unique identifier for one live connection's subscription, used for
/// precise cleanup when the connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Process-wide topic registry: topic name -> currently subscribed
/// connections. Fan-out is per connection, so a user with two open tabs
/// receives every broadcast twice.
#[derive(Debug, Default, Clone)]
pub struct ChannelRegistry {
    inner: Arc<RwLock<HashMap<String, Vec<Subscriber>>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, topic: &str) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard.entry(topic.to_string()).or_default().push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            "subscriber {:?} joined {}, now {}",
            subscriber_id,
            topic,
            guard.get(topic).map(|v| v.len()).unwrap_or(0)
        );

        (subscriber_id, rx)
    }

    pub async fn unsubscribe(&self, topic: &str, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;

        if let Some(subscribers) = guard.get_mut(topic) {
            subscribers.retain(|s| s.id != subscriber_id);
            if subscribers.is_empty() {
                guard.remove(topic);
            }
        }
    }

    /// Send a payload to every subscriber of a topic. Failed sends mean the
    /// receiving connection is gone; those subscribers are dropped here and
    /// the failure never reaches the caller.
    pub async fn broadcast(&self, topic: &str, payload: String) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(topic) {
            let before = subscribers.len();
            subscribers.retain(|subscriber| subscriber.sender.send(payload.clone()).is_ok());

            let dropped = before - subscribers.len();
            if dropped > 0 {
                tracing::debug!("broadcast to {}: {} dead subscribers dropped", topic, dropped);
            }
        }
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let guard = self.inner.read().await;
        guard.get(topic).map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_each_broadcast() {
        let registry = ChannelRegistry::new();
        let topic = chat_topic(Uuid::new_v4());

        let (_id_a, mut rx_a) = registry.subscribe(&topic).await;
        let (_id_b, mut rx_b) = registry.subscribe(&topic).await;

        registry.broadcast(&topic, "hello".to_string()).await;

        assert_eq!(rx_a.recv().await.unwrap(), "hello");
        assert_eq!(rx_b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn unsubscribed_connections_stop_receiving() {
        let registry = ChannelRegistry::new();
        let topic = chat_topic(Uuid::new_v4());

        let (id_a, mut rx_a) = registry.subscribe(&topic).await;
        let (_id_b, mut rx_b) = registry.subscribe(&topic).await;

        registry.unsubscribe(&topic, id_a).await;
        registry.broadcast(&topic, "after".to_string()).await;

        assert_eq!(rx_b.recv().await.unwrap(), "after");
        assert!(rx_a.recv().await.is_none());
    }

    #[tokio::test]
    async fn dead_subscribers_are_dropped_on_broadcast() {
        let registry = ChannelRegistry::new();
        let topic = chat_topic(Uuid::new_v4());

        let (_id_a, rx_a) = registry.subscribe(&topic).await;
        let (_id_b, mut rx_b) = registry.subscribe(&topic).await;
        drop(rx_a);

        registry.broadcast(&topic, "ping".to_string()).await;

        assert_eq!(registry.subscriber_count(&topic).await, 1);
        assert_eq!(rx_b.recv().await.unwrap(), "ping");
    }

    #[tokio::test]
    async fn broadcasts_do_not_cross_topics() {
        let registry = ChannelRegistry::new();
        let chat = chat_topic(Uuid::new_v4());
        let contracts = contract_topic(OrderKind::Service, Uuid::new_v4());

        let (_id, mut chat_rx) = registry.subscribe(&chat).await;
        let (_id, mut contract_rx) = registry.subscribe(&contracts).await;

        registry.broadcast(&contracts, "contract".to_string()).await;

        assert_eq!(contract_rx.recv().await.unwrap(), "contract");
        assert!(chat_rx.try_recv().is_err());
    }
}
