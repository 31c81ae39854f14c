use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PreviewError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PreviewError::protocol("x")
            .to_string()
            .contains("protocol error:")
    );
    assert!(
        PreviewError::transport("x")
            .to_string()
            .contains("transport error:")
    );
    assert!(
        PreviewError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn timeout_names_request_and_duration() {
    let err = PreviewError::Timeout {
        id: 4,
        timeout_ms: 250,
    };
    assert_eq!(err.to_string(), "request 4 timed out after 250 ms");
    assert!(!err.is_closed());
    assert!(PreviewError::ChannelClosed.is_closed());
}

#[test]
fn serde_json_errors_convert() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: PreviewError = parse.into();
    assert!(matches!(err, PreviewError::Serde(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PreviewError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
