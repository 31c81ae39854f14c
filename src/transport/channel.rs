use crate::foundation::config::{PlayerConfig, SurfaceKind};
use crate::foundation::error::{PreviewError, PreviewResult};
use crate::protocol::message::{Envelope, EnvelopeError, MessageKind};
use crate::transport::surface::{Container, Surface};
use serde_json::Value;

/// Why an inbound message never reached a listener or pending request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Sender origin does not match the trusted endpoint.
    Untrusted,
    /// Not a mapping, bad envelope fields, or neither `id` nor `message`.
    Malformed,
    /// Correlation id with no pending request (unknown, duplicate, or timed out).
    Unmatched,
    /// The channel has been disposed.
    Closed,
}

impl From<EnvelopeError> for DropReason {
    fn from(_: EnvelopeError) -> Self {
        Self::Malformed
    }
}

/// Owns one embedded surface and mediates all traffic with it.
pub struct Transport {
    surface: Option<Box<dyn Surface>>,
    src: String,
    trusted_origin: String,
    visible: bool,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("src", &self.src)
            .field("trusted_origin", &self.trusted_origin)
            .field("visible", &self.visible)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Transport {
    /// Embed a hidden surface for `kind` and `token` into `container`.
    pub fn open(
        container: &mut dyn Container,
        config: &PlayerConfig,
        token: &str,
        kind: SurfaceKind,
    ) -> PreviewResult<Self> {
        config.validate()?;
        let src = config.surface_url(kind, token)?;
        let trusted_origin = config.origin()?.to_string();
        let mut surface = container.embed(&src)?;
        surface.set_visible(false);
        tracing::debug!(%kind, origin = %trusted_origin, "surface embedded");
        Ok(Self {
            surface: Some(surface),
            src,
            trusted_origin,
            visible: false,
        })
    }

    /// URL the surface was pointed at.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Origin inbound messages must come from.
    pub fn trusted_origin(&self) -> &str {
        &self.trusted_origin
    }

    /// Whether the surface has signalled it finished loading.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the surface is still attached.
    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Serialize and post one envelope. Fire-and-forget; outbound order is preserved.
    pub fn send(&mut self, envelope: &Envelope) -> PreviewResult<()> {
        let surface = self.surface.as_mut().ok_or(PreviewError::ChannelClosed)?;
        let payload = envelope.encode()?;
        tracing::trace!(id = envelope.id, kind = ?envelope.kind, "post");
        surface.post(&payload)
    }

    /// Detach the surface. Returns `false` when it was already gone.
    pub fn dispose(&mut self) -> bool {
        let Some(mut surface) = self.surface.take() else {
            return false;
        };
        surface.set_visible(false);
        surface.detach();
        self.visible = false;
        tracing::debug!(src = %self.src, "surface detached");
        true
    }

    /// Authenticate and split one inbound payload.
    ///
    /// A `load` message reveals the surface the first time it is seen. Nothing here is reported
    /// to callers as an error: untrusted or malformed traffic is dropped.
    pub fn accept(&mut self, origin: &str, data: Value) -> Result<Envelope, DropReason> {
        if !self.is_open() {
            return Err(DropReason::Closed);
        }
        if !origin_matches(&self.trusted_origin, origin) {
            return Err(DropReason::Untrusted);
        }
        let envelope = Envelope::from_value(data)?;
        if envelope.kind == Some(MessageKind::Load) && !self.visible {
            self.reveal();
        }
        Ok(envelope)
    }

    fn reveal(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_visible(true);
            self.visible = true;
            tracing::debug!("surface revealed");
        }
    }
}

/// Case-sensitive prefix match that only allows a port after the trusted origin.
pub(crate) fn origin_matches(trusted: &str, origin: &str) -> bool {
    match origin.strip_prefix(trusted) {
        Some("") => true,
        Some(rest) => {
            rest.strip_prefix(':')
                .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/channel.rs"]
mod tests;
