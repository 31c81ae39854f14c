use crate::events::dispatcher::{EventEmitter, ListenerId};
use crate::foundation::config::{PlayerConfig, SurfaceKind};
use crate::foundation::error::{PreviewError, PreviewResult};
use crate::mux::pending::Reply;
use crate::protocol::capture::{CapturedImage, ImageFormat};
use crate::protocol::command::{Command, Query};
use crate::protocol::message::Body;
use crate::protocol::modifications::Modifications;
use crate::query::dynamic::{collect_dynamic_elements, collect_dynamic_sources};
use crate::session::bridge::{Bridge, Delivery};
use crate::state::element::ElementState;
use crate::state::renderer::RendererState;
use crate::transport::channel::Transport;
use crate::transport::surface::Container;
use serde_json::Value;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// Host-side handle to one embedded preview surface.
///
/// A `Player` owns the surface, its pending-request table and its listener registry. Clones share
/// the same channel. Inbound traffic is fed in through [`Player::handle_message`] (or
/// [`Player::pump`]); replies complete [`PendingReply`]s and everything else is published to
/// listeners registered with [`Player::on`] / [`Player::once`].
///
/// Listeners run synchronously inside `handle_message`, after the channel lock is released, so
/// they may call back into the player.
#[derive(Clone)]
pub struct Player {
    shared: Arc<Mutex<Bridge>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("bridge", &*self.lock())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Player {
    /// Embed a hidden surface into `container` and start accepting its messages.
    ///
    /// Never blocks; the surface reveals itself once the remote side sends `load`.
    #[tracing::instrument(skip_all, fields(kind = %kind))]
    pub fn open(
        container: &mut dyn Container,
        token: &str,
        kind: SurfaceKind,
        config: PlayerConfig,
    ) -> PreviewResult<Self> {
        let transport = Transport::open(container, &config, token, kind)?;
        Ok(Self {
            shared: Arc::new(Mutex::new(Bridge::new(transport))),
            timeout: config.request_timeout(),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Bridge> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inbound handler: authenticate, route and, for events, invoke listeners.
    pub fn handle_message(&self, origin: &str, data: Value) -> Delivery {
        let (delivery, fanout) = self.lock().route(origin, data);
        if let Some(fanout) = fanout {
            for listener in &fanout.listeners {
                listener(&fanout.payload);
            }
        }
        delivery
    }

    /// Detach the surface and reject every pending request with [`PreviewError::ChannelClosed`].
    ///
    /// Idempotent. Returns `true` only for the call that actually closed the channel. Also stops
    /// any running [`Player::pump`].
    #[tracing::instrument(skip_all)]
    pub fn dispose(&self) -> bool {
        let (was_open, listeners) = self.lock().dispose();
        drop(listeners);
        was_open
    }

    /// Whether [`Player::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        !self.lock().transport.is_open()
    }

    /// Whether the surface has finished loading and is shown.
    pub fn is_visible(&self) -> bool {
        self.lock().transport.is_visible()
    }

    /// URL the surface was pointed at.
    pub fn src(&self) -> String {
        self.lock().transport.src().to_string()
    }

    /// Requests still awaiting replies.
    pub fn pending_requests(&self) -> usize {
        self.lock().mux.pending_len()
    }

    /// Subscribe to every `name` event.
    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: Fn(&Body) + Send + Sync + 'static,
    {
        self.lock().events.subscribe(name, Arc::new(listener))
    }

    /// Subscribe to the next `name` event only.
    pub fn once<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: Fn(&Body) + Send + Sync + 'static,
    {
        self.lock().events.subscribe_once(name, Arc::new(listener))
    }

    /// Remove a subscription.
    pub fn off(&self, id: ListenerId) -> bool {
        let removed = self.lock().events.remove(id);
        removed.is_some()
    }

    /// Post an uncorrelated message. `body` must name a `message`.
    pub fn send_command(&self, body: Body) -> PreviewResult<()> {
        self.lock().send_command(body)
    }

    /// Post a typed command.
    pub fn command(&self, command: Command) -> PreviewResult<()> {
        self.lock().send(&command.into_envelope())
    }

    /// Post `body` with a fresh correlation id and return a handle to its reply.
    pub fn request(&self, body: Body) -> PreviewResult<PendingReply> {
        let (id, rx) = self.lock().request(body)?;
        Ok(PendingReply {
            player: self.clone(),
            id,
            rx,
            timeout: self.timeout,
            settled: false,
        })
    }

    /// Post `body` as a request and wait for its reply body (without `id` and `message`).
    pub async fn request_value(&self, body: Body) -> PreviewResult<Body> {
        self.request(body)?.wait().await
    }

    /// Load a template by id.
    pub fn load_template(&self, template_id: impl Into<String>) -> PreviewResult<()> {
        self.command(Command::SetTemplate {
            template_id: template_id.into(),
        })
    }

    /// Replace the surface's modification set.
    pub fn set_modifications(&self, modifications: &Modifications) -> PreviewResult<()> {
        self.command(Command::SetModifications(modifications.clone()))
    }

    /// Start playback.
    pub fn play(&self) -> PreviewResult<()> {
        self.command(Command::Play)
    }

    /// Pause playback.
    pub fn pause(&self) -> PreviewResult<()> {
        self.command(Command::Pause)
    }

    /// Current composition source as reported by the surface.
    pub async fn get_source(&self) -> PreviewResult<Body> {
        let mut reply = self.request_value(Query::GetSource.into_body()).await?;
        match reply.remove("source") {
            Some(Value::Object(source)) => Ok(source),
            Some(_) => Err(PreviewError::protocol("getSource reply 'source' is not an object")),
            None => Err(PreviewError::protocol("getSource reply has no 'source'")),
        }
    }

    /// Every element mapping in the current source flagged `dynamic: true`, at any depth.
    pub async fn get_dynamic_elements(&self) -> PreviewResult<Vec<Body>> {
        let source = self.get_source().await?;
        let elements = source.get("elements").unwrap_or(&Value::Null);
        Ok(collect_dynamic_sources(elements)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Still of the current frame.
    pub async fn get_image(&self, format: ImageFormat) -> PreviewResult<CapturedImage> {
        let blob = self.fetch_blob(format).await?;
        CapturedImage::from_data_url(&blob)
    }

    /// Still of the current frame as a `data:` URL.
    pub async fn get_image_as_data_url(&self, format: ImageFormat) -> PreviewResult<String> {
        let blob = self.fetch_blob(format).await?;
        if !blob.starts_with("data:") {
            return Err(PreviewError::protocol("image blob is not a data: URL"));
        }
        Ok(blob)
    }

    async fn fetch_blob(&self, format: ImageFormat) -> PreviewResult<String> {
        let mut reply = self
            .request_value(Query::GetImage(format).into_body())
            .await?;
        match reply.remove("blob") {
            Some(Value::String(blob)) => Ok(blob),
            Some(_) => Err(PreviewError::protocol("getImage reply 'blob' is not a string")),
            None => Err(PreviewError::protocol("getImage reply has no 'blob'")),
        }
    }

    /// Latest renderer state pushed by the surface, if any.
    pub fn state(&self) -> Option<RendererState> {
        self.lock().state.clone()
    }

    /// Top-level elements of the latest state.
    pub fn elements(&self) -> Vec<ElementState> {
        self.lock()
            .state
            .as_ref()
            .map(|s| s.elements.clone())
            .unwrap_or_default()
    }

    /// Dynamic elements of the latest state, at any depth.
    pub fn dynamic_elements(&self) -> Vec<ElementState> {
        self.lock()
            .state
            .as_ref()
            .map(|s| collect_dynamic_elements(s).into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// A request that has been posted and is awaiting its reply.
///
/// Dropping it before it resolves removes its pending entry, so a late reply is treated as
/// unmatched.
pub struct PendingReply {
    player: Player,
    id: u64,
    rx: oneshot::Receiver<Reply>,
    timeout: Option<Duration>,
    settled: bool,
}

impl std::fmt::Debug for PendingReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReply")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .field("settled", &self.settled)
            .finish()
    }
}

impl PendingReply {
    /// Correlation id assigned to this request.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the reply, the configured timeout, or disposal, whichever comes first.
    pub async fn wait(mut self) -> PreviewResult<Body> {
        let received = match self.timeout {
            None => (&mut self.rx).await.ok(),
            Some(limit) => match tokio::time::timeout(limit, &mut self.rx).await {
                Ok(r) => r.ok(),
                Err(_) => {
                    if self.player.lock().mux.cancel(self.id) {
                        self.settled = true;
                        tracing::debug!(id = self.id, ?limit, "request timed out");
                        return Err(PreviewError::Timeout {
                            id: self.id,
                            timeout_ms: limit.as_millis().min(u64::MAX as u128) as u64,
                        });
                    }
                    // Completed between the deadline and the cancel.
                    self.rx.try_recv().ok()
                }
            },
        };
        self.settled = true;
        received.unwrap_or(Err(PreviewError::ChannelClosed))
    }
}

impl IntoFuture for PendingReply {
    type Output = PreviewResult<Body>;
    type IntoFuture = Pin<Box<dyn Future<Output = PreviewResult<Body>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

// Listeners are always dropped outside the bridge lock, so a `PendingReply` captured by one can
// take the lock here.
impl Drop for PendingReply {
    fn drop(&mut self) {
        if !self.settled && self.player.lock().mux.cancel(self.id) {
            tracing::trace!(id = self.id, "abandoned request cancelled");
        }
    }
}
