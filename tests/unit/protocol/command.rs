use super::*;
use serde_json::json;

#[test]
fn set_template_carries_template_id() {
    let env = Command::SetTemplate {
        template_id: "65b7e907".to_string(),
    }
    .into_envelope();
    assert_eq!(env.id, None);
    assert_eq!(
        env.to_value(),
        json!({"message": "setTemplate", "templateId": "65b7e907"})
    );
}

#[test]
fn set_modifications_nests_the_mapping() {
    let mut mods = Modifications::new();
    mods.set("Title", "Hi");
    let env = Command::SetModifications(mods).into_envelope();
    assert_eq!(
        env.to_value(),
        json!({"message": "setModifications", "modifications": {"Title": "Hi"}})
    );
}

#[test]
fn playback_commands_have_empty_bodies() {
    assert_eq!(Command::Play.into_envelope().to_value(), json!({"message": "play"}));
    assert_eq!(Command::Pause.into_envelope().to_value(), json!({"message": "pause"}));
}

#[test]
fn query_bodies_name_the_request() {
    assert_eq!(
        Value::Object(Query::GetSource.into_body()),
        json!({"message": "getSource"})
    );
    assert_eq!(
        Value::Object(Query::GetImage(ImageFormat::Jpeg).into_body()),
        json!({"message": "getImage", "type": "image/jpeg"})
    );
}
