use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

const DEFAULT_EVENT_BUFFER: usize = 64;

pub type EventSender = mpsc::Sender<LobbyEvent>;
pub type EventReceiver = mpsc::Receiver<LobbyEvent>;

/// Notifications about a player's progress through the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LobbyEvent {
    Queued {
        username: String,
        ticket: String,
    },
    Matched {
        battle_id: String,
        opponent: String,
    },
    BattleConcluded {
        battle_id: String,
        winner: Option<String>,
        rounds: u32,
    },
}

/// Receiving half of a subscription; unsubscribes on drop.
pub struct EventSubscription {
    bus: EventBus,
    username: String,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.username, self.subscriber_id);
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug)]
struct EventBusInner {
    subscribers: RwLock<HashMap<String, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
    buffer: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_buffer(DEFAULT_EVENT_BUFFER)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicUsize::new(0),
                buffer: buffer.max(1),
            }),
        }
    }

    pub fn subscribe(&self, username: &str) -> EventSubscription {
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(username.to_string())
            .or_default()
            .push((id, tx));

        tracing::debug!(username = %username, subscriber_id = id, "lobby subscriber added");

        EventSubscription {
            bus: self.clone(),
            username: username.to_string(),
            subscriber_id: id,
            receiver: rx,
        }
    }

    /// Deliver `event` to every subscriber of `username` without blocking.
    /// Subscribers whose channel is full or closed are dropped.
    pub fn publish(&self, username: &str, event: LobbyEvent) {
        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.get(username).cloned()
        };
        let Some(list) = subscribers else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    username = %username,
                    subscriber_id = id,
                    error = ?e,
                    "dropping lobby subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(username, &failed);
        }
    }

    pub fn unsubscribe(&self, username: &str, subscriber_id: usize) {
        self.remove_subscribers(username, &[subscriber_id]);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    fn remove_subscribers(&self, username: &str, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = guard.get_mut(username) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(username);
            }
        }
    }
}
