use crate::foundation::error::{PreviewError, PreviewResult};
use crate::mux::pending::{PendingTable, Reply};
use crate::protocol::message::{Body, Envelope};
use crate::transport::channel::Transport;
use serde_json::Value;
use tokio::sync::oneshot;

/// Turns fire-and-forget posting into correlated request/reply pairs.
///
/// Replies may arrive in any order; the correlation id is the only thing tying a reply to its
/// request.
#[derive(Debug, Default)]
pub struct Multiplexer {
    pending: PendingTable,
}

impl Multiplexer {
    /// Create a multiplexer with an empty pending table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id, post `body` tagged with it, and register a completion.
    ///
    /// Any `id` already present in `body` is replaced. If posting fails the entry is removed
    /// again and the error returned.
    pub fn request(
        &mut self,
        transport: &mut Transport,
        body: Body,
    ) -> PreviewResult<(u64, oneshot::Receiver<Reply>)> {
        if !transport.is_open() {
            return Err(PreviewError::ChannelClosed);
        }
        let mut envelope = split(body)?;
        let (id, rx) = self.pending.allocate()?;
        envelope.id = Some(id);
        if let Err(e) = transport.send(&envelope) {
            self.pending.cancel(id);
            return Err(e);
        }
        tracing::trace!(id, kind = ?envelope.kind, "request posted");
        Ok((id, rx))
    }

    /// Post `body` without a correlation id. The body must name a `message`.
    pub fn send_command(&mut self, transport: &mut Transport, body: Body) -> PreviewResult<()> {
        let mut envelope = split(body)?;
        if envelope.kind.is_none() {
            return Err(PreviewError::validation("command body must name a message"));
        }
        envelope.id = None;
        transport.send(&envelope)
    }

    /// Route a reply body to its waiter. Returns `false` for unknown ids.
    pub fn complete(&mut self, id: u64, body: Body) -> bool {
        self.pending.complete(id, Ok(body))
    }

    /// Forget `id` without completing it.
    pub fn cancel(&mut self, id: u64) -> bool {
        self.pending.cancel(id)
    }

    /// Reject everything pending with [`PreviewError::ChannelClosed`].
    pub fn close(&mut self) -> usize {
        self.pending.reject_all()
    }

    /// Number of requests awaiting replies.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` is still awaiting its reply.
    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains(id)
    }
}

fn split(body: Body) -> PreviewResult<Envelope> {
    Envelope::from_value(Value::Object(body))
        .map_err(|e| PreviewError::validation(format!("outbound message envelope: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/mux/request.rs"]
mod tests;
