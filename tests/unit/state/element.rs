use super::*;
use serde_json::json;

fn parse(v: Value) -> ElementState {
    serde_json::from_value(v).unwrap()
}

#[test]
fn reads_leaf_without_elements() {
    let el = parse(json!({
        "track": 1, "time": 0.5, "duration": 3.0, "exit": 0.25,
        "source": {"type": "text", "name": "Title", "text": "Hello", "dynamic": true}
    }));
    assert_eq!(el.track, 1);
    assert!(el.is_dynamic());
    assert_eq!(el.element_type(), Some("text"));
    assert_eq!(el.selector(), Some("Title"));
    assert!(el.elements.is_none());
    assert!(el.children().is_empty());
    assert!(!el.is_composition());
}

#[test]
fn selector_falls_back_to_type() {
    let el = parse(json!({"track": 2, "time": 0, "duration": 1, "source": {"type": "image"}}));
    assert_eq!(el.selector(), Some("image"));
    assert_eq!(el.exit, 0.0);
}

#[test]
fn dynamic_requires_literal_true() {
    let el = parse(json!({"track": 1, "time": 0, "duration": 1, "source": {"dynamic": "true"}}));
    assert!(!el.is_dynamic());
}

#[test]
fn non_array_elements_become_no_children() {
    let el = parse(json!({
        "track": 1, "time": 0, "duration": 1,
        "source": {"type": "composition"},
        "elements": {"oops": true}
    }));
    assert!(el.elements.is_none());
    assert!(el.is_composition());
}

#[test]
fn malformed_children_are_skipped() {
    let el = parse(json!({
        "track": 1, "time": 0, "duration": 4,
        "source": {"type": "composition"},
        "elements": [
            {"track": 1, "time": 0, "duration": 1, "source": {"type": "text"}},
            "not an element",
            {"track": "x"}
        ]
    }));
    assert_eq!(el.children().len(), 1);
}

#[test]
fn serializes_without_absent_elements() {
    let el = ElementState {
        track: 1,
        duration: 2.0,
        ..ElementState::default()
    };
    let v = serde_json::to_value(&el).unwrap();
    assert!(v.get("elements").is_none());
}

#[test]
fn validate_checks_descendants() {
    let ok = parse(json!({
        "track": 1, "time": 0, "duration": 4, "exit": 1,
        "source": {"type": "composition", "name": "Group"},
        "elements": [{"track": 1, "time": 1, "duration": 2, "source": {"name": "Inner"}}]
    }));
    ok.validate().unwrap();

    let bad = parse(json!({
        "track": 1, "time": 0, "duration": 4,
        "source": {"type": "composition"},
        "elements": [{"track": 1, "time": 0, "duration": 1, "exit": 2, "source": {"name": "Inner"}}]
    }));
    let err = bad.validate().unwrap_err().to_string();
    assert!(err.contains("Inner"));
    assert!(err.contains("exceeds duration"));
}

#[test]
fn timing_fields_default_so_children_survive() {
    let el = parse(json!({
        "source": {"type": "composition"},
        "elements": [
            {"source": {"type": "text", "name": "Caption", "dynamic": true}}
        ]
    }));
    assert_eq!((el.track, el.time, el.duration), (0, 0.0, 0.0));
    assert_eq!(el.children().len(), 1);
    assert!(el.children()[0].is_dynamic());
}

#[test]
fn non_object_children_are_skipped() {
    let kids = parse_children(vec![json!([1, 0, 2]), json!(null), json!({"track": 3})]);
    assert_eq!(kids.len(), 1);
    assert_eq!(kids[0].track, 3);
}
