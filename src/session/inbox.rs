use crate::session::player::Player;
use crate::transport::surface::InboundMessage;
use tokio::sync::mpsc;

const INBOX_BATCH: usize = 64;

impl Player {
    /// Route inbound messages from `rx` until the sending side closes or the player is disposed.
    ///
    /// Messages are handled one at a time in arrival order. Disposal wakes the pump even when no
    /// message is pending. Returns how many were handled.
    pub async fn pump(&self, mut rx: mpsc::UnboundedReceiver<InboundMessage>) -> usize {
        let mut closed = self.lock().closed.subscribe();
        let mut handled = 0;
        let mut batch = Vec::with_capacity(INBOX_BATCH);
        loop {
            let received = tokio::select! {
                biased;
                _ = async { let _ = closed.wait_for(|c| *c).await; } => {
                    tracing::debug!(handled, "inbox stopped: player disposed");
                    return handled;
                }
                n = rx.recv_many(&mut batch, INBOX_BATCH) => n,
            };
            if received == 0 {
                break;
            }
            for msg in batch.drain(..) {
                if self.is_disposed() {
                    tracing::debug!(handled, "inbox stopped: player disposed");
                    return handled;
                }
                self.handle_message(&msg.origin, msg.data);
                handled += 1;
            }
        }
        tracing::debug!(handled, "inbox closed");
        handled
    }
}
