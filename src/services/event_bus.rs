//! Event Bus / SSE-backing service: fans published campaign and global
//! events out to registered observers with per-observer scoping, drop-oldest
//! backpressure, and keep-alives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// A published event: `{event_type, campaign_id, timestamp, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    pub campaign_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, campaign_id: Option<Uuid>, data: Value) -> Self {
        Self { event_type: event_type.into(), campaign_id, timestamp: Utc::now(), data }
    }

    fn keep_alive() -> Self {
        Self::new("keep_alive", None, Value::Null)
    }

    fn lagged(skipped: u64) -> Self {
        Self::new("lagged", None, serde_json::json!({ "skipped": skipped }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// What an observer is allowed to see: a specific campaign, or everything.
#[derive(Debug, Clone, Copy)]
pub struct ObserverFilter {
    pub user_id: Uuid,
    pub campaign_id: Option<Uuid>,
}

impl ObserverFilter {
    const fn matches(&self, event: &EventEnvelope) -> bool {
        match self.campaign_id {
            Some(id) => matches!(event.campaign_id, Some(eid) if eid == id),
            None => true,
        }
    }
}

/// Configuration for the Event Bus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Per-observer buffer capacity; the broadcast channel's lag-detection
    /// threshold doubles as the drop-oldest buffer size (§4.3).
    pub observer_buffer_size: usize,
    /// How often a keep-alive event is emitted per observer.
    pub keep_alive_interval: Duration,
    /// Consecutive failed deliveries before an observer is unregistered.
    pub max_consecutive_failures: u32,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            observer_buffer_size: 256,
            keep_alive_interval: Duration::from_secs(20),
            max_consecutive_failures: 3,
        }
    }
}

impl From<crate::domain::models::EventBusConfig> for EventBusConfig {
    fn from(config: crate::domain::models::EventBusConfig) -> Self {
        Self {
            observer_buffer_size: config.observer_buffer_size,
            keep_alive_interval: Duration::from_secs(config.keep_alive_interval_secs),
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

struct ObserverEntry {
    filter: ObserverFilter,
    consecutive_failures: Arc<AtomicU32>,
}

/// A live subscription returned from [`EventBus::register`]. Drop it (or
/// call [`Subscription::unregister`]) to stop receiving events.
pub struct Subscription {
    id: ObserverId,
    filter: ObserverFilter,
    receiver: broadcast::Receiver<EventEnvelope>,
    bus: EventBus,
    initial_keep_alive_sent: bool,
}

impl Subscription {
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next event visible to this observer's filter. The first
    /// call always yields an immediate `keep_alive`, per §4.3's registration
    /// contract. Returns `None` once the bus is gone (all senders dropped).
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if !self.initial_keep_alive_sent {
            self.initial_keep_alive_sent = true;
            return Some(EventEnvelope::keep_alive());
        }
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return Some(EventEnvelope::lagged(skipped));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The caller's transport reports a failed write (e.g. a dead SSE
    /// connection). After `max_consecutive_failures` reports the observer
    /// is unregistered and further calls are no-ops.
    pub async fn report_delivery_failure(&self) {
        self.bus.record_failure(self.id).await;
    }

    pub async fn report_delivery_success(&self) {
        self.bus.reset_failures(self.id).await;
    }

    pub async fn unregister(self) {
        self.bus.unregister(self.id).await;
    }
}

/// Central event bus: single broadcast channel, per-observer filtering.
///
/// Broadcast's built-in lag handling is exactly the "bounded per-observer
/// buffer, drop-oldest, never block the publisher" contract this service
/// needs, so publishing never waits on a slow consumer.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    observers: Arc<RwLock<HashMap<ObserverId, ObserverEntry>>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.observer_buffer_size);
        Self { sender, observers: Arc::new(RwLock::new(HashMap::new())), config }
    }

    /// Register a new observer. The transport is responsible for sending
    /// [`EventBus::keep_alive_event`] to this subscription on its own timer
    /// (`keep_alive_interval`); a shared broadcast publish can't carry a
    /// keep-alive addressed to one observer without reaching everyone else.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, filter: ObserverFilter) -> Subscription {
        let id = ObserverId::new();
        self.observers.write().await.insert(
            id,
            ObserverEntry { filter, consecutive_failures: Arc::new(AtomicU32::new(0)) },
        );
        tracing::debug!(observer_id = %id.0, "observer registered");
        Subscription {
            id,
            filter,
            receiver: self.sender.subscribe(),
            bus: self.clone(),
            initial_keep_alive_sent: false,
        }
    }

    /// Publish an event to every observer whose filter matches. Never
    /// blocks on a slow consumer: `broadcast::Sender::send` only fails when
    /// there are no receivers at all, which is not an error here.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub fn publish(&self, event: EventEnvelope) {
        let _ = self.sender.send(event);
    }

    pub async fn record_failure(&self, id: ObserverId) {
        let should_unregister = {
            let observers = self.observers.read().await;
            if let Some(entry) = observers.get(&id) {
                let failures = entry.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                failures >= self.config.max_consecutive_failures
            } else {
                false
            }
        };
        if should_unregister {
            tracing::warn!(observer_id = %id.0, "unregistering observer after repeated delivery failures");
            self.unregister(id).await;
        }
    }

    pub async fn reset_failures(&self, id: ObserverId) {
        if let Some(entry) = self.observers.read().await.get(&id) {
            entry.consecutive_failures.store(0, Ordering::SeqCst);
        }
    }

    pub async fn unregister(&self, id: ObserverId) {
        self.observers.write().await.remove(&id);
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    pub const fn keep_alive_interval(&self) -> Duration {
        self.config.keep_alive_interval
    }

    /// Build the keep-alive event a transport should send on its own
    /// schedule, per-observer, at `keep_alive_interval`.
    pub fn keep_alive_event() -> EventEnvelope {
        EventEnvelope::keep_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EventBusConfig {
        EventBusConfig { observer_buffer_size: 4, keep_alive_interval: Duration::from_secs(1), max_consecutive_failures: 2 }
    }

    #[tokio::test]
    async fn observer_receives_only_matching_campaign_events() {
        let bus = EventBus::new(config());
        let campaign_a = Uuid::new_v4();
        let campaign_b = Uuid::new_v4();
        let mut sub = bus.register(ObserverFilter { user_id: Uuid::new_v4(), campaign_id: Some(campaign_a) }).await;
        assert_eq!(sub.next().await.unwrap().event_type, "keep_alive");

        bus.publish(EventEnvelope::new("phase_started", Some(campaign_a), Value::Null));
        bus.publish(EventEnvelope::new("phase_started", Some(campaign_b), Value::Null));
        bus.publish(EventEnvelope::new("phase_completed", Some(campaign_a), Value::Null));

        let first = sub.next().await.unwrap();
        assert_eq!(first.event_type, "phase_started");
        assert_eq!(first.campaign_id, Some(campaign_a));

        let second = sub.next().await.unwrap();
        assert_eq!(second.event_type, "phase_completed");
    }

    #[tokio::test]
    async fn global_observer_sees_every_campaign() {
        let bus = EventBus::new(config());
        let mut sub = bus.register(ObserverFilter { user_id: Uuid::new_v4(), campaign_id: None }).await;
        assert_eq!(sub.next().await.unwrap().event_type, "keep_alive");

        bus.publish(EventEnvelope::new("e1", Some(Uuid::new_v4()), Value::Null));
        bus.publish(EventEnvelope::new("e2", Some(Uuid::new_v4()), Value::Null));

        assert_eq!(sub.next().await.unwrap().event_type, "e1");
        assert_eq!(sub.next().await.unwrap().event_type, "e2");
    }

    #[tokio::test]
    async fn slow_consumer_receives_lagged_marker_instead_of_blocking_publisher() {
        let bus = EventBus::new(config());
        let mut sub = bus.register(ObserverFilter { user_id: Uuid::new_v4(), campaign_id: None }).await;
        assert_eq!(sub.next().await.unwrap().event_type, "keep_alive");

        for i in 0..10 {
            bus.publish(EventEnvelope::new(format!("e{i}"), None, Value::Null));
        }

        let event = sub.next().await.unwrap();
        assert_eq!(event.event_type, "lagged");
    }

    #[tokio::test]
    async fn repeated_delivery_failures_unregister_the_observer() {
        let bus = EventBus::new(config());
        let sub = bus.register(ObserverFilter { user_id: Uuid::new_v4(), campaign_id: None }).await;
        let id = sub.id();

        assert_eq!(bus.observer_count().await, 1);
        sub.report_delivery_failure().await;
        sub.report_delivery_failure().await;
        assert_eq!(bus.observer_count().await, 0);
        let _ = id;
    }

    #[tokio::test]
    async fn success_report_resets_the_failure_counter() {
        let bus = EventBus::new(config());
        let sub = bus.register(ObserverFilter { user_id: Uuid::new_v4(), campaign_id: None }).await;

        sub.report_delivery_failure().await;
        sub.report_delivery_success().await;
        sub.report_delivery_failure().await;
        assert_eq!(bus.observer_count().await, 1);
    }
}
