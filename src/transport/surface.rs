use crate::foundation::error::{PreviewError, PreviewResult};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// The embedded remote rendering surface, as seen from the host.
///
/// Only the owning [`crate::Transport`] talks to a surface. Posting is fire-and-forget; the
/// surface answers, if at all, through [`InboundMessage`]s delivered to the player.
pub trait Surface: Send {
    /// Deliver one serialized message. Must not block.
    fn post(&mut self, payload: &str) -> PreviewResult<()>;
    /// Show or hide the surface.
    fn set_visible(&mut self, visible: bool);
    /// Remove the surface from its container and invalidate its endpoint.
    fn detach(&mut self);
}

/// Host element a surface is embedded into.
pub trait Container {
    /// Replace the container's content with a hidden surface pointed at `src`.
    fn embed(&mut self, src: &str) -> PreviewResult<Box<dyn Surface>>;
}

/// One message received from the surface side, with the origin its sender declared.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundMessage {
    /// Declared sender origin, e.g. `https://creatomate.com`.
    pub origin: String,
    /// Raw payload.
    pub data: Value,
}

impl InboundMessage {
    /// Build a message.
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// Everything an [`InMemoryContainer`] surface has observed.
#[derive(Clone, Debug, Default)]
pub struct SurfaceRecord {
    /// URL of the most recent embed.
    pub src: Option<String>,
    /// Number of embeds performed.
    pub embeds: usize,
    /// Payloads posted to the current surface, in order.
    pub posted: Vec<String>,
    /// Current visibility.
    pub visible: bool,
    /// Whether the current surface has been detached.
    pub detached: bool,
    /// When set, `post` fails with a transport error.
    pub reject_posts: bool,
}

/// Shared handle to a [`SurfaceRecord`].
#[derive(Clone, Debug, Default)]
pub struct SurfaceLog(Arc<Mutex<SurfaceRecord>>);

impl SurfaceLog {
    fn lock(&self) -> MutexGuard<'_, SurfaceRecord> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> SurfaceRecord {
        self.lock().clone()
    }

    /// Posted payloads parsed back into JSON. Unparsable payloads are skipped.
    pub fn posted_values(&self) -> Vec<Value> {
        self.lock()
            .posted
            .iter()
            .filter_map(|p| serde_json::from_str(p).ok())
            .collect()
    }

    /// Make subsequent posts fail.
    pub fn reject_posts(&self, reject: bool) {
        self.lock().reject_posts = reject;
    }
}

/// In-memory container for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryContainer {
    log: SurfaceLog,
}

impl InMemoryContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting what embedded surfaces observed.
    pub fn log(&self) -> SurfaceLog {
        self.log.clone()
    }
}

impl Container for InMemoryContainer {
    fn embed(&mut self, src: &str) -> PreviewResult<Box<dyn Surface>> {
        let mut rec = self.log.lock();
        let embeds = rec.embeds + 1;
        let reject_posts = rec.reject_posts;
        *rec = SurfaceRecord {
            src: Some(src.to_string()),
            embeds,
            reject_posts,
            ..SurfaceRecord::default()
        };
        Ok(Box::new(InMemorySurface {
            log: self.log.clone(),
        }))
    }
}

struct InMemorySurface {
    log: SurfaceLog,
}

impl Surface for InMemorySurface {
    fn post(&mut self, payload: &str) -> PreviewResult<()> {
        let mut rec = self.log.lock();
        if rec.detached {
            return Err(PreviewError::transport("surface detached"));
        }
        if rec.reject_posts {
            return Err(PreviewError::transport("surface rejected message"));
        }
        rec.posted.push(payload.to_string());
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) {
        self.log.lock().visible = visible;
    }

    fn detach(&mut self) {
        let mut rec = self.log.lock();
        rec.detached = true;
        rec.visible = false;
        rec.src = None;
    }
}

/// Container whose surfaces forward outbound payloads onto an unbounded channel, for hosts that
/// drive the remote side from another task.
#[derive(Debug)]
pub struct MpscContainer {
    tx: mpsc::UnboundedSender<String>,
}

impl MpscContainer {
    /// Create a container and the receiving end of its outbound queue.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Container for MpscContainer {
    fn embed(&mut self, src: &str) -> PreviewResult<Box<dyn Surface>> {
        tracing::debug!(src, "embedding channel-backed surface");
        Ok(Box::new(MpscSurface {
            tx: Some(self.tx.clone()),
        }))
    }
}

struct MpscSurface {
    tx: Option<mpsc::UnboundedSender<String>>,
}

impl Surface for MpscSurface {
    fn post(&mut self, payload: &str) -> PreviewResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| PreviewError::transport("surface detached"))?;
        tx.send(payload.to_string())
            .map_err(|_| PreviewError::transport("surface channel closed"))
    }

    fn set_visible(&mut self, visible: bool) {
        tracing::trace!(visible, "channel-backed surface visibility");
    }

    fn detach(&mut self) {
        self.tx = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/surface.rs"]
mod tests;
