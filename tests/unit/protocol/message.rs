use super::*;
use serde_json::json;

#[test]
fn splits_envelope_fields_from_body() {
    let env = Envelope::from_value(json!({"id": 3, "message": "getSource", "extra": true})).unwrap();
    assert_eq!(env.id, Some(3));
    assert_eq!(env.kind, Some(MessageKind::GetSource));
    assert_eq!(Value::Object(env.body), json!({"extra": true}));
}

#[test]
fn null_fields_count_as_absent() {
    let env = Envelope::from_value(json!({"id": null, "message": null, "a": 1})).unwrap();
    assert_eq!(env.id, None);
    assert_eq!(env.kind, None);
    assert_eq!(env.body.len(), 1);
}

#[test]
fn rejects_non_mappings_and_bad_envelope_fields() {
    assert_eq!(
        Envelope::from_value(json!("load")),
        Err(EnvelopeError::NotAMapping)
    );
    assert_eq!(
        Envelope::from_value(json!([1, 2])),
        Err(EnvelopeError::NotAMapping)
    );
    assert_eq!(
        Envelope::from_value(json!({"id": 0})),
        Err(EnvelopeError::BadId)
    );
    assert_eq!(
        Envelope::from_value(json!({"id": -2})),
        Err(EnvelopeError::BadId)
    );
    assert_eq!(
        Envelope::from_value(json!({"id": "7"})),
        Err(EnvelopeError::BadId)
    );
    assert_eq!(
        Envelope::from_value(json!({"message": 5})),
        Err(EnvelopeError::BadKind)
    );
}

#[test]
fn unknown_kinds_are_kept_verbatim() {
    let kind = MessageKind::from_wire("timeUpdate");
    assert_eq!(kind, MessageKind::Other("timeUpdate".to_string()));
    assert_eq!(kind.as_str(), "timeUpdate");
    assert_eq!(MessageKind::from_wire("stateChange"), MessageKind::StateChange);
}

#[test]
fn command_encodes_flat_object() {
    let mut body = Body::new();
    body.insert("templateId".to_string(), json!("tpl-1"));
    let env = Envelope::command(MessageKind::SetTemplate, body);
    let encoded: Value = serde_json::from_str(&env.encode().unwrap()).unwrap();
    assert_eq!(
        encoded,
        json!({"message": "setTemplate", "templateId": "tpl-1"})
    );
}

#[test]
fn envelope_id_overrides_body_field() {
    let mut body = Body::new();
    body.insert("id".to_string(), json!("spoofed"));
    let env = Envelope {
        id: Some(9),
        kind: None,
        body,
    };
    assert_eq!(env.to_value(), json!({"id": 9}));
}
