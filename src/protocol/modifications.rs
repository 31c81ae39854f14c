use crate::protocol::message::Body;
use crate::state::element::ElementState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The host's current overrides, `selector -> value`.
///
/// Serializes as a plain JSON object, which is what both the `setModifications` command and any
/// render-trigger URL builder consume.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifications(BTreeMap<String, Value>);

impl Modifications {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `selector` to `value`, returning the previous value.
    pub fn set(&mut self, selector: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(selector.into(), value.into())
    }

    /// Remove `selector`, returning its value.
    pub fn remove(&mut self, selector: &str) -> Option<Value> {
        self.0.remove(selector)
    }

    /// Set or clear the override for `element`. An empty `value` clears it.
    ///
    /// Returns the selector used, or `None` when the element has neither a name nor a type to
    /// address it by.
    pub fn apply<'e>(&mut self, element: &'e ElementState, value: &str) -> Option<&'e str> {
        let selector = element.selector()?;
        if value.is_empty() {
            self.0.remove(selector);
        } else {
            self.0.insert(selector.to_string(), Value::String(value.to_string()));
        }
        Some(selector)
    }

    /// Current value for `selector`.
    pub fn get(&self, selector: &str) -> Option<&Value> {
        self.0.get(selector)
    }

    /// Overrides in selector order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no overrides are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON object form.
    pub fn to_body(&self) -> Body {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl FromIterator<(String, Value)> for Modifications {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/modifications.rs"]
mod tests;
