use super::*;
use serde_json::json;

fn sample() -> Value {
    json!({
        "undo": true,
        "redo": false,
        "duration": 8.5,
        "source": {"output_format": "mp4", "width": 1280, "height": 720},
        "elements": [
            {"track": 1, "time": 0, "duration": 8.5, "source": {"type": "video", "dynamic": true}},
            {"track": 2, "time": 1, "duration": 4, "source": {"type": "composition"},
             "elements": [
                {"track": 1, "time": 0, "duration": 2, "source": {"type": "text", "name": "Caption"}}
             ]}
        ]
    })
}

#[test]
fn parses_snapshot() {
    let st = RendererState::from_value(sample()).unwrap();
    assert!(st.undo);
    assert!(!st.redo);
    assert_eq!(st.duration, 8.5);
    assert_eq!(st.source.get("width"), Some(&json!(1280)));
    assert_eq!(st.elements.len(), 2);
    assert_eq!(st.element_count(), 3);
    st.validate().unwrap();
}

#[test]
fn missing_fields_default() {
    let st = RendererState::from_value(json!({})).unwrap();
    assert_eq!(st, RendererState::default());
}

#[test]
fn malformed_top_level_elements_become_empty() {
    let st = RendererState::from_value(json!({"duration": 1, "elements": "nope"})).unwrap();
    assert!(st.elements.is_empty());
}

#[test]
fn rejects_non_object_snapshot() {
    assert!(RendererState::from_value(json!([1, 2])).is_err());
    assert!(RendererState::from_reader("{".as_bytes()).is_err());
}

#[test]
fn validate_rejects_negative_duration() {
    let st = RendererState {
        duration: -1.0,
        ..RendererState::default()
    };
    assert!(st.validate().is_err());
}

fn nested_json(depth: usize) -> String {
    let mut s = String::from(r#"{"duration": 1, "elements": ["#);
    for _ in 0..depth {
        s.push_str(r#"{"track": 1, "time": 0, "duration": 1, "source": {"type": "composition"}, "elements": ["#);
    }
    s.push_str(r#"{"track": 1, "time": 0, "duration": 1, "source": {"type": "text", "name": "Deep", "dynamic": true}}"#);
    for _ in 0..depth {
        s.push_str("]}");
    }
    s.push_str("]}");
    s
}

#[test]
fn reads_deeply_nested_compositions_from_text() {
    let st = RendererState::from_reader(nested_json(120).as_bytes()).unwrap();
    assert_eq!(st.element_count(), 121);
    let found = crate::query::dynamic::collect_dynamic_elements(&st);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), Some("Deep"));
}

#[test]
fn from_value_builds_deep_trees() {
    let value: Value = {
        let json = nested_json(120);
        let mut de = serde_json::Deserializer::from_str(&json);
        de.disable_recursion_limit();
        Value::deserialize(&mut de).unwrap()
    };
    let st = RendererState::from_value(value).unwrap();
    assert_eq!(st.element_count(), 121);
    st.validate().unwrap();
}

#[test]
fn trailing_garbage_is_rejected() {
    assert!(RendererState::from_reader(r#"{"duration": 1} x"#.as_bytes()).is_err());
}
