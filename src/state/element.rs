use crate::foundation::error::{PreviewError, PreviewResult};
use crate::protocol::message::Body;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One node of a composition tree as reported by the remote surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    /// Timeline track this element occupies.
    #[serde(default)]
    pub track: i64,
    /// Appearance time relative to the parent composition, in seconds.
    #[serde(default)]
    pub time: f64,
    /// Visible duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Exit transition time in seconds, i.e. how long the next element overlaps it.
    #[serde(default)]
    pub exit: f64,
    /// The element's declarative source without its `elements` property.
    #[serde(default)]
    pub source: Body,
    /// Child elements. Only set when this element is a composition.
    #[serde(
        default,
        deserialize_with = "lenient_children",
        skip_serializing_if = "Option::is_none"
    )]
    pub elements: Option<Vec<ElementState>>,
}

impl ElementState {
    /// Whether the element's source flags it as overridable at render time.
    pub fn is_dynamic(&self) -> bool {
        is_dynamic_source(&self.source)
    }

    /// `source.type`, e.g. `text`, `image`, `video` or `composition`.
    pub fn element_type(&self) -> Option<&str> {
        self.source.get("type").and_then(Value::as_str)
    }

    /// `source.name`, if set.
    pub fn name(&self) -> Option<&str> {
        self.source.get("name").and_then(Value::as_str)
    }

    /// Key used to address this element in a modification set: its name, else its type.
    pub fn selector(&self) -> Option<&str> {
        self.name().or_else(|| self.element_type())
    }

    /// Whether this node carries children.
    pub fn is_composition(&self) -> bool {
        self.elements.as_ref().is_some_and(|e| !e.is_empty())
            || self.element_type() == Some("composition")
    }

    /// Children, empty for leaves.
    pub fn children(&self) -> &[ElementState] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Check the timing invariants of this node and all its descendants.
    pub fn validate(&self) -> PreviewResult<()> {
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            el.validate_timing()?;
            stack.extend(el.children());
        }
        Ok(())
    }

    fn validate_timing(&self) -> PreviewResult<()> {
        let label = self.selector().unwrap_or("<unnamed>");
        for (field, v) in [
            ("time", self.time),
            ("duration", self.duration),
            ("exit", self.exit),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PreviewError::validation(format!(
                    "element '{label}' {field} must be finite and non-negative, got {v}"
                )));
            }
        }
        if self.exit > self.duration {
            return Err(PreviewError::validation(format!(
                "element '{label}' exit ({}) exceeds duration ({})",
                self.exit, self.duration
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_dynamic_source(source: &Body) -> bool {
    matches!(source.get("dynamic"), Some(Value::Bool(true)))
}

/// Accept whatever the surface sends for `elements`: a non-array is no children, and entries that
/// do not parse are skipped.
pub(crate) fn lenient_children<'de, D>(deserializer: D) -> Result<Option<Vec<ElementState>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(children_from_value(raw))
}

/// Lenient reading of a raw `elements` field. See [`parse_children`].
pub(crate) fn children_from_value(raw: Option<Value>) -> Option<Vec<ElementState>> {
    match raw {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(parse_children(items)),
        Some(other) => {
            tracing::warn!(kind = json_kind(&other), "ignoring non-array elements field");
            None
        }
    }
}

/// A composition whose children are still being built.
struct Pending {
    node: ElementState,
    items: std::iter::Enumerate<std::vec::IntoIter<Value>>,
    built: Vec<ElementState>,
}

/// Build a list of nodes and all their descendants without recursing, so nesting depth is
/// bounded only by memory.
pub(crate) fn parse_children(items: Vec<Value>) -> Vec<ElementState> {
    let mut stack = vec![Pending {
        node: ElementState::default(),
        items: items.into_iter().enumerate(),
        built: Vec::new(),
    }];
    loop {
        let Some(top) = stack.last_mut() else {
            return Vec::new();
        };
        if let Some((idx, item)) = top.items.next() {
            match parse_node(item) {
                Ok((node, Some(children))) => stack.push(Pending {
                    node,
                    items: children.into_iter().enumerate(),
                    built: Vec::new(),
                }),
                Ok((node, None)) => top.built.push(node),
                Err(e) => {
                    tracing::warn!(idx, depth = stack.len(), error = %e, "skipping malformed element")
                }
            }
            continue;
        }
        let Some(mut done) = stack.pop() else {
            return Vec::new();
        };
        match stack.last_mut() {
            Some(parent) => {
                done.node.elements = Some(done.built);
                parent.built.push(done.node);
            }
            None => return done.built,
        }
    }
}

/// One node without its children, plus its raw child list when it has a usable one.
fn parse_node(item: Value) -> Result<(ElementState, Option<Vec<Value>>), serde_json::Error> {
    let Value::Object(mut fields) = item else {
        return Err(serde::de::Error::custom(format!(
            "expected an element object, got {}",
            json_kind(&item)
        )));
    };
    let children = match fields.remove("elements") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            tracing::warn!(kind = json_kind(&other), "ignoring non-array elements field");
            None
        }
    };
    let node = serde_json::from_value(Value::Object(fields))?;
    Ok((node, children))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/element.rs"]
mod tests;
