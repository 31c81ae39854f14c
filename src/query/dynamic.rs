use crate::protocol::message::Body;
use crate::state::element::{ElementState, is_dynamic_source};
use crate::state::renderer::RendererState;
use serde_json::Value;

/// Anything whose direct children are [`ElementState`] nodes.
pub trait ElementTree {
    /// Direct children, in timeline order.
    fn children(&self) -> &[ElementState];
}

impl ElementTree for RendererState {
    fn children(&self) -> &[ElementState] {
        &self.elements
    }
}

impl ElementTree for ElementState {
    fn children(&self) -> &[ElementState] {
        ElementState::children(self)
    }
}

impl ElementTree for [ElementState] {
    fn children(&self) -> &[ElementState] {
        self
    }
}

/// Every dynamic node in the tree, depth-first pre-order.
///
/// Static compositions are still descended into. The root itself is not inspected, only its
/// descendants. Uses an explicit work stack, so depth is bounded only by memory.
pub fn collect_dynamic_elements<T: ElementTree + ?Sized>(tree: &T) -> Vec<&ElementState> {
    let mut out = Vec::new();
    let mut stack: Vec<&ElementState> = tree.children().iter().rev().collect();
    while let Some(el) = stack.pop() {
        if el.is_dynamic() {
            out.push(el);
        }
        stack.extend(el.children().iter().rev());
    }
    out
}

/// Dynamic nodes among the tree's direct children only.
pub fn filter_dynamic_top_level<T: ElementTree + ?Sized>(tree: &T) -> Vec<&ElementState> {
    tree.children().iter().filter(|el| el.is_dynamic()).collect()
}

/// Every mapping flagged `dynamic: true` in a raw composition source, depth-first pre-order.
///
/// Works on the untyped `elements` array returned by `getSource`, where each element's children
/// sit under its own `elements` key. Anything that is not an array of mappings contributes no
/// children.
pub fn collect_dynamic_sources(elements: &Value) -> Vec<&Body> {
    let mut out = Vec::new();
    let mut stack: Vec<&Body> = source_children(elements).rev().collect();
    while let Some(el) = stack.pop() {
        if is_dynamic_source(el) {
            out.push(el);
        }
        if let Some(children) = el.get("elements") {
            stack.extend(source_children(children).rev());
        }
    }
    out
}

fn source_children(v: &Value) -> impl DoubleEndedIterator<Item = &Body> {
    v.as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_object)
}

#[cfg(test)]
#[path = "../../tests/unit/query/dynamic.rs"]
mod tests;
