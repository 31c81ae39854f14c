use crate::protocol::capture::ImageFormat;
use crate::protocol::message::{Body, Envelope, MessageKind};
use crate::protocol::modifications::Modifications;
use serde_json::Value;

/// Fire-and-forget instructions for the remote surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Load a template by id.
    SetTemplate {
        /// Template id.
        template_id: String,
    },
    /// Replace the active modification set.
    SetModifications(Modifications),
    /// Start playback.
    Play,
    /// Pause playback.
    Pause,
}

impl Command {
    /// Encode as an uncorrelated envelope.
    pub fn into_envelope(self) -> Envelope {
        let mut body = Body::new();
        let kind = match self {
            Self::SetTemplate { template_id } => {
                body.insert("templateId".to_string(), Value::String(template_id));
                MessageKind::SetTemplate
            }
            Self::SetModifications(mods) => {
                body.insert("modifications".to_string(), Value::Object(mods.to_body()));
                MessageKind::SetModifications
            }
            Self::Play => MessageKind::Play,
            Self::Pause => MessageKind::Pause,
        };
        Envelope::command(kind, body)
    }
}

/// Requests that expect a correlated reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    /// Current composition source; reply carries `source`.
    GetSource,
    /// Still of the current frame; reply carries `blob` as a `data:` URL.
    GetImage(ImageFormat),
}

impl Query {
    /// Request body, without the correlation id.
    pub fn into_body(self) -> Body {
        let mut body = Body::new();
        let kind = match self {
            Self::GetSource => MessageKind::GetSource,
            Self::GetImage(format) => {
                body.insert("type".to_string(), Value::String(format.mime().to_string()));
                MessageKind::GetImage
            }
        };
        body.insert(
            crate::protocol::message::KIND_FIELD.to_string(),
            Value::String(kind.as_str().to_string()),
        );
        body
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/command.rs"]
mod tests;
