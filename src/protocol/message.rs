use crate::foundation::error::PreviewResult;
use serde_json::{Map, Value};

/// Message body: the JSON object fields left after the envelope fields are split off.
pub type Body = Map<String, Value>;

/// Envelope field carrying the correlation id.
pub const ID_FIELD: &str = "id";
/// Envelope field carrying the message kind.
pub const KIND_FIELD: &str = "message";

/// Known message kinds, plus an opaque fallback for anything the bridge does not interpret.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// The remote surface finished initialising and accepts commands.
    Ready,
    /// A template finished loading; reveals the embedded surface.
    Load,
    /// The remote surface pushed a new [`crate::RendererState`].
    StateChange,
    /// The remote surface reported an error.
    Error,
    /// Load a template by id.
    SetTemplate,
    /// Replace the active modification set.
    SetModifications,
    /// Ask for the current composition source.
    GetSource,
    /// Ask for a still of the current frame.
    GetImage,
    /// Start playback.
    Play,
    /// Pause playback.
    Pause,
    /// Any other event or command name.
    Other(String),
}

impl MessageKind {
    /// Parse a wire name.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "ready" => Self::Ready,
            "load" => Self::Load,
            "stateChange" => Self::StateChange,
            "error" => Self::Error,
            "setTemplate" => Self::SetTemplate,
            "setModifications" => Self::SetModifications,
            "getSource" => Self::GetSource,
            "getImage" => Self::GetImage,
            "play" => Self::Play,
            "pause" => Self::Pause,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire name, which is also the event name listeners subscribe to.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "ready",
            Self::Load => "load",
            Self::StateChange => "stateChange",
            Self::Error => "error",
            Self::SetTemplate => "setTemplate",
            Self::SetModifications => "setModifications",
            Self::GetSource => "getSource",
            Self::GetImage => "getImage",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an inbound payload could not be split into an [`Envelope`].
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The payload is not a JSON object.
    #[error("payload is not a JSON object")]
    NotAMapping,
    /// `id` is present but not a positive integer.
    #[error("'id' must be a positive integer")]
    BadId,
    /// `message` is present but not a string.
    #[error("'message' must be a string")]
    BadKind,
}

/// One message on the wire: `{ id?, message?, ...body }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Correlation id; present on requests expecting a reply and on their replies.
    pub id: Option<u64>,
    /// Event or command name.
    pub kind: Option<MessageKind>,
    /// Remaining fields.
    pub body: Body,
}

impl Envelope {
    /// Build an uncorrelated command.
    pub fn command(kind: MessageKind, body: Body) -> Self {
        Self {
            id: None,
            kind: Some(kind),
            body,
        }
    }

    /// Split a raw payload. `null` envelope fields count as absent.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Object(mut body) = value else {
            return Err(EnvelopeError::NotAMapping);
        };

        let id = match body.remove(ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_u64() {
                Some(id) if id > 0 => Some(id),
                _ => return Err(EnvelopeError::BadId),
            },
        };

        let kind = match body.remove(KIND_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(MessageKind::from_wire(&name)),
            Some(_) => return Err(EnvelopeError::BadKind),
        };

        Ok(Self { id, kind, body })
    }

    /// Reassemble the flat wire object. Envelope fields win over same-named body fields.
    pub fn to_value(&self) -> Value {
        let mut out = self.body.clone();
        if let Some(kind) = &self.kind {
            out.insert(KIND_FIELD.to_string(), Value::String(kind.as_str().to_string()));
        }
        if let Some(id) = self.id {
            out.insert(ID_FIELD.to_string(), Value::from(id));
        }
        Value::Object(out)
    }

    /// Serialize for posting to the surface.
    pub fn encode(&self) -> PreviewResult<String> {
        Ok(serde_json::to_string(&self.to_value())?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/message.rs"]
mod tests;
