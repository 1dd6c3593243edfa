//! Callback ingress, exercised in-process.

#![cfg(all(feature = "http-server", feature = "http-client"))]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tokio::sync::mpsc;
use tower::ServiceExt;
use worksbot_core::{CallbackEvent, EventKind, Source};
use worksbot_transport::server::HEALTH_TEXT;
use worksbot_transport::signature::{SIGNATURE_HEADER, sign};
use worksbot_transport::{CallbackHandler, IngressSettings, callback_router, serve};

const SECRET: &str = "api-id";

struct Forward(mpsc::UnboundedSender<CallbackEvent>);

#[async_trait]
impl CallbackHandler for Forward {
    async fn handle(&self, event: CallbackEvent) {
        let _ = self.0.send(event);
    }
}

fn router() -> (axum::Router, mpsc::UnboundedReceiver<CallbackEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = callback_router(&IngressSettings::new(SECRET), Arc::new(Forward(tx)));
    (router, rx)
}

fn post(body: &'static str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/callback");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (router, _rx) = router();
    let resp = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], HEALTH_TEXT.as_bytes());
}

#[tokio::test]
async fn test_signed_callback_reaches_handler() {
    let body = r#"{"type":"join","source":{"roomId":"r1"}}"#;
    let (router, mut rx) = router();

    let resp = router
        .oneshot(post(body, Some(sign(SECRET, body.as_bytes()).unwrap())))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, CallbackEvent::new(Source::room("r1"), EventKind::Join));
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let (router, mut rx) = router();
    let resp = router
        .oneshot(post(r#"{"type":"join","source":{"roomId":"r1"}}"#, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_wrong_signature_is_rejected() {
    let body = r#"{"type":"join","source":{"roomId":"r1"}}"#;
    let (router, mut rx) = router();
    let resp = router
        .oneshot(post(body, Some(sign("other-secret", body.as_bytes()).unwrap())))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    for body in ["not json", r#"{"type":"join"}"#] {
        let (router, mut rx) = router();
        let resp = router
            .oneshot(post(body, Some(sign(SECRET, body.as_bytes()).unwrap())))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(rx.try_recv().is_err());
    }
}

#[tokio::test]
async fn test_serve_binds_and_stops() {
    let (router, _rx) = router();
    let handle = serve("127.0.0.1:0", router).await.unwrap();
    assert_ne!(handle.local_addr().port(), 0);

    let url = format!("http://{}/", handle.local_addr());
    let text = reqwest::get(&url).await.unwrap().text().await.unwrap();
    assert_eq!(text, HEALTH_TEXT);

    handle.stop().await;
}
