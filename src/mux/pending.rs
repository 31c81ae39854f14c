use crate::foundation::error::{PreviewError, PreviewResult};
use crate::protocol::message::Body;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// What a pending request eventually completes with.
pub type Reply = PreviewResult<Body>;

/// Correlation id -> completion for every request still awaiting its reply.
///
/// Ids start at 1 and are never reused within one table. Each entry is removed exactly once: by
/// its reply, by cancellation, or by [`PendingTable::reject_all`].
#[derive(Debug, Default)]
pub struct PendingTable {
    last_id: u64,
    waiters: HashMap<u64, oneshot::Sender<Reply>>,
}

impl PendingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id and register a completion for it.
    pub fn allocate(&mut self) -> PreviewResult<(u64, oneshot::Receiver<Reply>)> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| PreviewError::protocol("correlation ids exhausted"))?;
        self.last_id = id;
        let (tx, rx) = oneshot::channel();
        let prev = self.waiters.insert(id, tx);
        debug_assert!(prev.is_none(), "correlation id {id} reused");
        Ok((id, rx))
    }

    /// Complete `id` with `reply`. Returns `false` when no entry exists.
    ///
    /// A waiter that stopped listening still counts as matched; its entry is consumed.
    pub fn complete(&mut self, id: u64, reply: Reply) -> bool {
        let Some(tx) = self.waiters.remove(&id) else {
            return false;
        };
        if tx.send(reply).is_err() {
            tracing::trace!(id, "reply arrived after its waiter went away");
        }
        true
    }

    /// Forget `id` without completing it. Returns `false` when no entry exists.
    pub fn cancel(&mut self, id: u64) -> bool {
        self.waiters.remove(&id).is_some()
    }

    /// Fail every pending entry with [`PreviewError::ChannelClosed`]. Returns how many there were.
    pub fn reject_all(&mut self) -> usize {
        let n = self.waiters.len();
        for (id, tx) in self.waiters.drain() {
            tracing::trace!(id, "rejecting pending request");
            let _ = tx.send(Err(PreviewError::ChannelClosed));
        }
        n
    }

    /// Whether `id` is still awaiting its reply.
    pub fn contains(&self, id: u64) -> bool {
        self.waiters.contains_key(&id)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Most recently allocated id, `0` before the first allocation.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mux/pending.rs"]
mod tests;
