use crate::protocol::message::Body;
use std::collections::HashMap;
use std::sync::Arc;

/// Callback invoked with an event's payload.
pub type Listener = Arc<dyn Fn(&Body) + Send + Sync>;

/// Handle returned by a subscription, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Capability set for named-event publish/subscribe.
pub trait EventEmitter {
    /// Invoke `listener` on every `name` event until unsubscribed.
    fn subscribe(&mut self, name: &str, listener: Listener) -> ListenerId;
    /// Invoke `listener` on the next `name` event only.
    fn subscribe_once(&mut self, name: &str, listener: Listener) -> ListenerId;
    /// Remove a subscription. Returns `false` when it no longer exists.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;
    /// Deliver `payload` to every current `name` listener. Returns how many were invoked.
    fn publish(&mut self, name: &str, payload: &Body) -> usize;
}

struct Subscription {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

/// Per-channel listener registry.
///
/// Listeners for one name fire in subscription order. One-shot subscriptions are removed before
/// they are invoked, so a listener that re-enters the dispatcher never sees itself twice.
#[derive(Default)]
pub struct EventDispatcher {
    last_id: u64,
    by_name: HashMap<String, Vec<Subscription>>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .by_name
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("listeners", &counts)
            .finish()
    }
}

impl EventDispatcher {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: &str, once: bool, listener: Listener) -> ListenerId {
        self.last_id += 1;
        let id = ListenerId(self.last_id);
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push(Subscription { id, once, listener });
        id
    }

    /// Snapshot the listeners to invoke for one `name` event, dropping one-shot subscriptions
    /// from the registry.
    ///
    /// The caller invokes the returned listeners after releasing any lock around the
    /// dispatcher, so listeners may subscribe or unsubscribe freely.
    pub fn take_listeners(&mut self, name: &str) -> Vec<Listener> {
        let Some(subs) = self.by_name.get_mut(name) else {
            return Vec::new();
        };
        let out = subs.iter().map(|s| Arc::clone(&s.listener)).collect();
        subs.retain(|s| !s.once);
        if subs.is_empty() {
            self.by_name.remove(name);
        }
        out
    }

    /// Number of live subscriptions for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.by_name.get(name).map_or(0, Vec::len)
    }

    /// Remove a subscription and hand back its listener.
    pub fn remove(&mut self, id: ListenerId) -> Option<Listener> {
        let (name, pos) = self.by_name.iter().find_map(|(name, subs)| {
            subs.iter()
                .position(|s| s.id == id)
                .map(|pos| (name.clone(), pos))
        })?;
        let subs = self.by_name.get_mut(&name)?;
        let sub = subs.remove(pos);
        if subs.is_empty() {
            self.by_name.remove(&name);
        }
        Some(sub.listener)
    }

    /// Remove every subscription, handing back the listeners.
    ///
    /// Listeners may own captured state whose drop re-enters the owner of this registry, so
    /// callers holding a lock drop the returned values after releasing it.
    pub fn clear(&mut self) -> Vec<Listener> {
        self.by_name
            .drain()
            .flat_map(|(_, subs)| subs.into_iter().map(|s| s.listener))
            .collect()
    }
}

impl EventEmitter for EventDispatcher {
    fn subscribe(&mut self, name: &str, listener: Listener) -> ListenerId {
        self.add(name, false, listener)
    }

    fn subscribe_once(&mut self, name: &str, listener: Listener) -> ListenerId {
        self.add(name, true, listener)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.remove(id).is_some()
    }

    fn publish(&mut self, name: &str, payload: &Body) -> usize {
        let listeners = self.take_listeners(name);
        for l in &listeners {
            l(payload);
        }
        listeners.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/dispatcher.rs"]
mod tests;
