use crate::events::dispatcher::{EventDispatcher, Listener};
use crate::foundation::error::PreviewResult;
use crate::mux::pending::Reply;
use crate::mux::request::Multiplexer;
use crate::protocol::message::{Body, Envelope, MessageKind};
use crate::state::renderer::RendererState;
use crate::transport::channel::{DropReason, Transport};
use serde_json::Value;
use tokio::sync::{oneshot, watch};

/// Outcome of routing one inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Completed the pending request with this correlation id.
    Reply {
        /// Correlation id.
        id: u64,
    },
    /// Published as a named event.
    Event {
        /// Event name.
        name: String,
        /// Listeners invoked.
        listeners: usize,
    },
    /// Never reached a listener or pending request.
    Dropped(DropReason),
}

/// Listeners to run once the channel lock is released, with their shared payload.
pub(crate) struct Fanout {
    pub(crate) listeners: Vec<Listener>,
    pub(crate) payload: Body,
}

/// Everything one channel instance owns: its surface, pending requests, listeners and the last
/// state snapshot. Never shared across channels.
#[derive(Debug)]
pub(crate) struct Bridge {
    pub(crate) transport: Transport,
    pub(crate) mux: Multiplexer,
    pub(crate) events: EventDispatcher,
    pub(crate) state: Option<RendererState>,
    /// Flips to `true` once on dispose.
    pub(crate) closed: watch::Sender<bool>,
}

impl Bridge {
    pub(crate) fn new(transport: Transport) -> Self {
        Self {
            transport,
            mux: Multiplexer::new(),
            events: EventDispatcher::new(),
            state: None,
            closed: watch::Sender::new(false),
        }
    }

    pub(crate) fn request(&mut self, body: Body) -> PreviewResult<(u64, oneshot::Receiver<Reply>)> {
        self.mux.request(&mut self.transport, body)
    }

    pub(crate) fn send_command(&mut self, body: Body) -> PreviewResult<()> {
        self.mux.send_command(&mut self.transport, body)
    }

    pub(crate) fn send(&mut self, envelope: &Envelope) -> PreviewResult<()> {
        self.transport.send(envelope)
    }

    /// Authenticate and route one inbound message.
    ///
    /// Messages with a correlation id go to the multiplexer; messages with only a kind become
    /// events. Listener invocation is left to the caller so it can happen outside the lock.
    pub(crate) fn route(&mut self, origin: &str, data: Value) -> (Delivery, Option<Fanout>) {
        let envelope = match self.transport.accept(origin, data) {
            Ok(env) => env,
            Err(reason) => {
                tracing::trace!(origin, ?reason, "inbound message dropped");
                return (Delivery::Dropped(reason), None);
            }
        };

        if let Some(id) = envelope.id {
            if self.mux.complete(id, envelope.body) {
                tracing::trace!(id, "reply delivered");
                return (Delivery::Reply { id }, None);
            }
            tracing::trace!(id, "reply without pending request dropped");
            return (Delivery::Dropped(DropReason::Unmatched), None);
        }

        let Some(kind) = envelope.kind else {
            tracing::trace!("inbound message has neither id nor message");
            return (Delivery::Dropped(DropReason::Malformed), None);
        };

        if kind == MessageKind::StateChange {
            self.record_state(&envelope.body);
        }

        let listeners = self.events.take_listeners(kind.as_str());
        let delivery = Delivery::Event {
            name: kind.as_str().to_string(),
            listeners: listeners.len(),
        };
        tracing::trace!(event = %kind, listeners = listeners.len(), "event routed");
        (
            delivery,
            Some(Fanout {
                listeners,
                payload: envelope.body,
            }),
        )
    }

    fn record_state(&mut self, body: &Body) {
        match RendererState::from_value(Value::Object(body.clone())) {
            Ok(state) => {
                tracing::trace!(
                    duration = state.duration,
                    elements = state.element_count(),
                    "renderer state updated"
                );
                self.state = Some(state);
            }
            Err(e) => tracing::warn!(error = %e, "ignoring unparsable renderer state"),
        }
    }

    /// Detach the surface, reject pending requests and unregister listeners. Safe to repeat.
    ///
    /// The removed listeners are handed back so the caller can drop them after releasing its
    /// lock.
    pub(crate) fn dispose(&mut self) -> (bool, Vec<Listener>) {
        let was_open = self.transport.dispose();
        let rejected = self.mux.close();
        let listeners = self.events.clear();
        self.closed.send_replace(true);
        if was_open {
            tracing::debug!(rejected, "channel disposed");
        }
        (was_open, listeners)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/bridge.rs"]
mod tests;
