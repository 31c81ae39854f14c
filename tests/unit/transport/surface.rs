use super::*;
use serde_json::json;

#[test]
fn in_memory_surface_records_lifecycle() {
    let mut container = InMemoryContainer::new();
    let log = container.log();
    let mut surface = container.embed("https://creatomate.com/player?token=t").unwrap();

    let rec = log.snapshot();
    assert_eq!(rec.src.as_deref(), Some("https://creatomate.com/player?token=t"));
    assert_eq!(rec.embeds, 1);
    assert!(!rec.visible);

    surface.post(r#"{"message":"play"}"#).unwrap();
    surface.set_visible(true);
    assert_eq!(log.posted_values(), vec![json!({"message": "play"})]);
    assert!(log.snapshot().visible);

    surface.detach();
    let rec = log.snapshot();
    assert!(rec.detached);
    assert!(!rec.visible);
    assert_eq!(rec.src, None);
    assert!(surface.post("{}").is_err());
}

#[test]
fn re_embedding_replaces_previous_content() {
    let mut container = InMemoryContainer::new();
    let log = container.log();
    let mut first = container.embed("a").unwrap();
    first.post("{}").unwrap();
    let _second = container.embed("b").unwrap();

    let rec = log.snapshot();
    assert_eq!(rec.embeds, 2);
    assert_eq!(rec.src.as_deref(), Some("b"));
    assert!(rec.posted.is_empty());
}

#[test]
fn rejecting_posts_surfaces_transport_errors() {
    let mut container = InMemoryContainer::new();
    let log = container.log();
    let mut surface = container.embed("a").unwrap();
    log.reject_posts(true);
    let err = surface.post("{}").unwrap_err();
    assert!(matches!(err, PreviewError::Transport(_)));
}

#[test]
fn mpsc_surface_forwards_in_order_until_detached() {
    let (mut container, mut rx) = MpscContainer::new();
    let mut surface = container.embed("a").unwrap();
    surface.post("1").unwrap();
    surface.post("2").unwrap();
    assert_eq!(rx.try_recv().unwrap(), "1");
    assert_eq!(rx.try_recv().unwrap(), "2");

    surface.detach();
    assert!(surface.post("3").is_err());
    assert!(rx.try_recv().is_err());
}
