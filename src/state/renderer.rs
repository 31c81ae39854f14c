use crate::foundation::error::{PreviewError, PreviewResult};
use crate::protocol::message::Body;
use crate::state::element::{ElementState, children_from_value, lenient_children};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Snapshot of the whole composition plus editor-session flags.
///
/// Produced by the remote surface on load and after every edit. The host treats it as read-only;
/// changes go through the channel and come back as a new snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RendererState {
    /// Whether an edit can be undone.
    #[serde(default)]
    pub undo: bool,
    /// Whether an undone edit can be reapplied.
    #[serde(default)]
    pub redo: bool,
    /// Total duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Top-level composition source without its `elements` property.
    #[serde(default)]
    pub source: Body,
    /// Top-level elements.
    #[serde(default, deserialize_with = "lenient_top_level")]
    pub elements: Vec<ElementState>,
}

impl RendererState {
    /// Parse a snapshot from a JSON value.
    ///
    /// The element tree is built iteratively, so nesting depth is bounded only by memory.
    pub fn from_value(mut value: Value) -> PreviewResult<Self> {
        let elements = value.as_object_mut().and_then(|m| m.remove("elements"));
        let mut state: Self = serde_json::from_value(value)
            .map_err(|e| PreviewError::validation(format!("parse renderer state: {e}")))?;
        state.elements = children_from_value(elements).unwrap_or_default();
        Ok(state)
    }

    /// Parse a snapshot from a JSON reader.
    ///
    /// serde_json's 128-level nesting limit is lifted; each composition level uses two.
    pub fn from_reader<R: std::io::Read>(r: R) -> PreviewResult<Self> {
        let mut de = serde_json::Deserializer::from_reader(r);
        de.disable_recursion_limit();
        let value = Value::deserialize(&mut de)
            .and_then(|v| de.end().map(|()| v))
            .map_err(|e| PreviewError::validation(format!("parse renderer state JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a snapshot from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PreviewResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PreviewError::validation(format!("open renderer state '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of nodes in the tree, compositions included.
    pub fn element_count(&self) -> usize {
        let mut n = 0;
        let mut stack: Vec<&ElementState> = self.elements.iter().collect();
        while let Some(el) = stack.pop() {
            n += 1;
            stack.extend(el.children());
        }
        n
    }

    /// Check `duration` and the timing invariants of every element.
    pub fn validate(&self) -> PreviewResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(PreviewError::validation(format!(
                "renderer duration must be finite and non-negative, got {}",
                self.duration
            )));
        }
        self.elements.iter().try_for_each(ElementState::validate)
    }
}

fn lenient_top_level<'de, D>(deserializer: D) -> Result<Vec<ElementState>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_children(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/state/renderer.rs"]
mod tests;
