use super::*;
use serde_json::json;

fn leaf(name: &str, dynamic: bool) -> ElementState {
    let mut source = Body::new();
    source.insert("type".to_string(), json!("text"));
    source.insert("name".to_string(), json!(name));
    if dynamic {
        source.insert("dynamic".to_string(), json!(true));
    }
    ElementState {
        track: 1,
        duration: 1.0,
        source,
        ..ElementState::default()
    }
}

fn group(name: &str, dynamic: bool, children: Option<Vec<ElementState>>) -> ElementState {
    let mut el = leaf(name, dynamic);
    el.source.insert("type".to_string(), json!("composition"));
    el.elements = children;
    el
}

fn names<'a>(els: &[&'a ElementState]) -> Vec<&'a str> {
    els.iter().filter_map(|e| e.name()).collect()
}

#[test]
fn finds_dynamic_node_at_depth_three() {
    let state = RendererState {
        elements: vec![group(
            "a",
            false,
            Some(vec![group(
                "b",
                false,
                Some(vec![group("c", false, Some(vec![leaf("deep", true)]))]),
            )]),
        )],
        ..RendererState::default()
    };
    assert_eq!(names(&collect_dynamic_elements(&state)), vec!["deep"]);
    assert!(filter_dynamic_top_level(&state).is_empty());
}

#[test]
fn empty_when_nothing_is_dynamic() {
    let state = RendererState {
        elements: vec![leaf("x", false), group("g", false, Some(vec![leaf("y", false)]))],
        ..RendererState::default()
    };
    assert!(collect_dynamic_elements(&state).is_empty());
}

#[test]
fn missing_children_do_not_stop_other_branches() {
    let state = RendererState {
        elements: vec![
            group("hollow", false, None),
            group("full", false, Some(vec![leaf("kept", true)])),
        ],
        ..RendererState::default()
    };
    assert_eq!(names(&collect_dynamic_elements(&state)), vec!["kept"]);
}

#[test]
fn pre_order_includes_dynamic_compositions_and_their_children() {
    let state = RendererState {
        elements: vec![
            group(
                "g1",
                true,
                Some(vec![leaf("g1.a", true), leaf("g1.b", false), leaf("g1.c", true)]),
            ),
            leaf("top", true),
        ],
        ..RendererState::default()
    };
    assert_eq!(
        names(&collect_dynamic_elements(&state)),
        vec!["g1", "g1.a", "g1.c", "top"]
    );
    assert_eq!(names(&filter_dynamic_top_level(&state)), vec!["g1", "top"]);
}

#[test]
fn works_on_subtrees_and_slices() {
    let g = group("g", false, Some(vec![leaf("in", true)]));
    assert_eq!(names(&collect_dynamic_elements(&g)), vec!["in"]);

    let slice = vec![leaf("s", true), leaf("t", false)];
    assert_eq!(names(&filter_dynamic_top_level(slice.as_slice())), vec!["s"]);
}

#[test]
fn very_deep_trees_do_not_overflow() {
    let mut node = leaf("bottom", true);
    for i in 0..100_000 {
        node = group(&format!("n{i}"), false, Some(vec![node]));
    }
    let state = RendererState {
        elements: vec![node],
        ..RendererState::default()
    };
    assert_eq!(names(&collect_dynamic_elements(&state)), vec!["bottom"]);

    // Default drop glue recurses; unwind by hand.
    let mut pending = state.elements;
    while let Some(mut el) = pending.pop() {
        if let Some(children) = el.elements.take() {
            pending.extend(children);
        }
    }
}

#[test]
fn raw_source_walk_matches_typed_walk() {
    let elements = json!([
        {"type": "text", "name": "Title", "dynamic": true},
        {"type": "composition", "elements": [
            {"type": "image", "name": "Logo", "dynamic": true},
            {"type": "composition", "elements": "broken"},
            42,
            {"type": "video", "dynamic": false}
        ]},
        {"type": "composition"}
    ]);
    let found = collect_dynamic_sources(&elements);
    let found_names: Vec<_> = found
        .iter()
        .filter_map(|b| b.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(found_names, vec!["Title", "Logo"]);
    assert!(collect_dynamic_sources(&json!({"not": "an array"})).is_empty());
}

#[test]
fn trackless_composition_still_yields_dynamic_children() {
    let state = RendererState::from_value(json!({
        "elements": [
            {"source": {"type": "composition"},
             "elements": [{"source": {"type": "text", "name": "Inner", "dynamic": true}}]}
        ]
    }))
    .unwrap();
    assert_eq!(names(&collect_dynamic_elements(&state)), vec!["Inner"]);
}
