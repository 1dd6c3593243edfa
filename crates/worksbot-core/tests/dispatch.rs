//! Dispatch behaviour over raw callback bodies.

use serde_json::{Value, json};
use worksbot_core::{
    DispatchFeatures, Dispatcher, Replies, ReplyContent, ReplyPayload, parse_callback_event,
};

const IMAGE_HOST: &str = "https://img.example.com";

fn dispatcher() -> Dispatcher {
    Dispatcher::new(DispatchFeatures::default(), Replies::default(), IMAGE_HOST)
}

fn classify(body: Value) -> Option<ReplyPayload> {
    let raw = serde_json::to_vec(&body).unwrap();
    let event = parse_callback_event(&raw).unwrap();
    dispatcher().classify(&event)
}

fn text_event(text: &str, postback: Option<&str>) -> Value {
    let mut content = json!({"type": "text", "text": text});
    if let Some(postback) = postback {
        content["postback"] = json!(postback);
    }
    json!({"type": "message", "source": {"accountId": "a1"}, "content": content})
}

fn content_type(payload: &ReplyPayload) -> &'static str {
    payload.content.as_ref().map_or("none", ReplyContent::content_type)
}

#[test]
fn test_fallback_contains_input_verbatim() {
    for input in ["hello", "bb", "Button_Template", "quick_reply", "  c  ", "すし"] {
        let payload = classify(text_event(input, None)).unwrap();
        let reply = payload.content.unwrap();
        let text = reply.as_text().unwrap();
        assert!(text.contains(input), "{text:?} should echo {input:?}");
        assert_eq!(text, Replies::default().fallback(input));
    }
}

#[test]
fn test_start_ignores_text() {
    for input in ["b", "carousel", "anything"] {
        let payload = classify(text_event(input, Some("start"))).unwrap();
        assert_eq!(
            payload.content,
            Some(ReplyContent::text(Replies::default().welcome))
        );
    }
}

#[test]
fn test_shorthand_and_canonical_tokens() {
    let cases = [
        ("b", "button_template"),
        ("B", "button_template"),
        ("button_template", "button_template"),
        ("l", "list_template"),
        ("list_template", "list_template"),
        ("C", "carousel"),
        ("carousel", "carousel"),
        ("i", "image_carousel"),
        ("image_carousel", "image_carousel"),
    ];
    for (token, expected) in cases {
        let payload = classify(text_event(token, None)).unwrap();
        assert_eq!(content_type(&payload), expected, "token {token:?}");
    }

    let payload = classify(text_event("q", None)).unwrap();
    let reply = serde_json::to_value(payload.content.unwrap()).unwrap();
    assert_eq!(reply["type"], "text");
    assert_eq!(reply["quickReply"]["items"].as_array().unwrap().len(), 10);
}

#[test]
fn test_candidate_priority() {
    // postback selects the list, text selects quick reply; list wins
    let payload = classify(text_event("q", Some("list_template"))).unwrap();
    assert_eq!(content_type(&payload), "list_template");

    // postback selects the image carousel, text selects button; button wins
    let payload = classify(text_event("B", Some("image_carousel"))).unwrap();
    assert_eq!(content_type(&payload), "button_template");
}

#[test]
fn test_member_interpolation() {
    let payload = classify(json!({
        "type": "joined",
        "source": {"roomId": "r1"},
        "memberList": ["u1", "u2"]
    }))
    .unwrap();
    let reply = payload.content.unwrap();
    assert!(reply.as_text().unwrap().starts_with("u1,u2 "));

    let payload = classify(json!({"type": "left", "source": {"roomId": "r1"}, "memberList": []}))
        .unwrap();
    let reply = payload.content.unwrap();
    assert_eq!(
        reply.as_text().unwrap(),
        format!(" {}", Replies::default().left_suffix)
    );
}

#[test]
fn test_addressing() {
    let payload = classify(json!({
        "type": "join",
        "source": {"roomId": "r1", "accountId": "a1"}
    }))
    .unwrap();
    assert_eq!(serde_json::to_value(&payload).unwrap()["roomId"], "r1");
    assert!(serde_json::to_value(&payload).unwrap().get("accountId").is_none());

    let payload = classify(text_event("hi", None)).unwrap();
    assert_eq!(serde_json::to_value(&payload).unwrap()["accountId"], "a1");
}

#[test]
fn test_idempotent() {
    let body = text_event("c", Some("carousel"));
    let first = serde_json::to_vec(&classify(body.clone())).unwrap();
    let second = serde_json::to_vec(&classify(body)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_carousel_end_to_end() {
    let payload = classify(text_event("c", Some("carousel"))).unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["accountId"], "a1");
    assert_eq!(json["content"]["type"], "carousel");
    let columns = json["content"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(
        columns[0]["thumbnailImageUrl"],
        format!("{IMAGE_HOST}/images/giraffe01.png")
    );
    assert_eq!(columns[0]["defaultAction"]["type"], "postback");
    assert_eq!(columns[0]["defaultAction"]["data"], "button_template");
}

#[test]
fn test_leave_has_target_and_no_content() {
    let payload = classify(json!({"type": "leave", "source": {"roomId": "r9"}})).unwrap();
    assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"roomId": "r9"}));
}

#[test]
fn test_echoes() {
    let payload = classify(json!({
        "type": "message",
        "source": {"accountId": "a1"},
        "content": {"type": "sticker", "packageId": "11", "stickerId": "22"}
    }))
    .unwrap();
    assert_eq!(payload.content, Some(ReplyContent::sticker("11", "22")));

    let payload = classify(json!({
        "type": "message",
        "source": {"accountId": "a1"},
        "content": {"type": "image", "resourceId": "res-1"}
    }))
    .unwrap();
    assert_eq!(payload.content, Some(ReplyContent::image("res-1")));

    let payload = classify(json!({
        "type": "message",
        "source": {"roomId": "r1"},
        "content": {"type": "location", "address": "Tokyo", "latitude": 35.5, "longitude": 139.75}
    }))
    .unwrap();
    assert_eq!(
        payload.content.unwrap().as_text(),
        Some("address:Tokyo\nlat:35.5\nlon:139.75")
    );
}

#[test]
fn test_postback_event_runs_matcher() {
    let payload = classify(json!({
        "type": "postback",
        "source": {"accountId": "a1"},
        "data": "image_carousel"
    }))
    .unwrap();
    assert_eq!(content_type(&payload), "image_carousel");

    let payload = classify(json!({
        "type": "postback",
        "source": {"accountId": "a1"},
        "data": "unrelated"
    }))
    .unwrap();
    assert!(payload.content.is_none());
}

#[test]
fn test_unhandled() {
    assert!(classify(json!({"type": "typing", "source": {"accountId": "a1"}})).is_none());
    assert!(
        classify(json!({
            "type": "message",
            "source": {"accountId": "a1"},
            "content": {"type": "file", "resourceId": "x"}
        }))
        .is_none()
    );
}

#[test]
fn test_every_reply_validates() {
    let tokens = ["b", "l", "c", "i", "q", "hello"];
    for token in tokens {
        let payload = classify(text_event(token, None)).unwrap();
        payload.content.unwrap().validate().unwrap();
    }
}
