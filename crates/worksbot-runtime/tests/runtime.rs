//! Callback processing through the assembled runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;
use tokio::sync::mpsc;
use worksbot_core::model::LocationContent;
use worksbot_core::{
    CallbackEvent, EventKind, MessageContent, ReplyContent, ReplyPayload, ReplyTarget, Source,
};
use worksbot_runtime::{Outcome, RuntimeError, WorksBotConfig, WorksBotRuntime};
use worksbot_transport::signature::{SIGNATURE_HEADER, sign};
use worksbot_transport::{
    Deliver, DeliveryError, DeliveryResult, StaticToken, TokenError, TokenResult, TokenSource,
};

const PRIVATE_KEY: &str = include_str!("fixtures/test_key.pem");

struct Recorder {
    tx: mpsc::UnboundedSender<(ReplyPayload, String)>,
    fail_with: Option<DeliveryError>,
}

#[async_trait]
impl Deliver for Recorder {
    async fn deliver(&self, payload: &ReplyPayload, token: &str) -> DeliveryResult<()> {
        let _ = self.tx.send((payload.clone(), token.to_string()));
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct CountingTokens {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl TokenSource for CountingTokens {
    async fn token(&self) -> TokenResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(TokenError::Request("unreachable".to_string()))
        } else {
            Ok("tok".to_string())
        }
    }
}

fn config() -> WorksBotConfig {
    let mut config = WorksBotConfig::default();
    config.works.api_id = "API".to_string();
    config.works.server_id = "server-1".to_string();
    config.works.consumer_key = "consumer-key".to_string();
    config.works.bot_no = 42;
    config.works.private_key = Some(PRIVATE_KEY.to_string());
    config.dispatch.image_host = "https://img.example.com".to_string();
    config
}

fn runtime_with(
    tokens: Arc<dyn TokenSource>,
    fail_with: Option<DeliveryError>,
) -> (
    WorksBotRuntime,
    mpsc::UnboundedReceiver<(ReplyPayload, String)>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let runtime =
        WorksBotRuntime::with_parts(config(), tokens, Arc::new(Recorder { tx, fail_with }))
            .unwrap();
    (runtime, rx)
}

fn text(source: Source, text: &str) -> CallbackEvent {
    CallbackEvent::new(source, EventKind::Message(MessageContent::text(text)))
}

#[tokio::test]
async fn test_template_reply_is_delivered() {
    let (runtime, mut rx) = runtime_with(Arc::new(StaticToken("tok".into())), None);

    let outcome = runtime
        .process(&text(Source::account("a1"), "c"))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Delivered);

    let (payload, token) = rx.try_recv().unwrap();
    assert_eq!(token, "tok");
    assert_eq!(payload.target, ReplyTarget::account("a1"));
    assert_eq!(payload.content.unwrap().content_type(), "carousel");
}

#[tokio::test]
async fn test_room_wins_over_account() {
    let (runtime, mut rx) = runtime_with(Arc::new(StaticToken("tok".into())), None);
    let source = Source {
        account_id: Some("a1".to_string()),
        room_id: Some("r1".to_string()),
    };

    runtime.process(&text(source, "hello")).await.unwrap();

    let (payload, _) = rx.try_recv().unwrap();
    assert_eq!(payload.target, ReplyTarget::room("r1"));
    assert_eq!(
        payload.content,
        Some(ReplyContent::text("I see.\n(received: hello)"))
    );
}

#[tokio::test]
async fn test_leave_needs_no_token() {
    let tokens = Arc::new(CountingTokens::default());
    let (runtime, mut rx) = runtime_with(tokens.clone(), None);

    let outcome = runtime
        .process(&CallbackEvent::new(Source::room("r9"), EventKind::Leave))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::NoContent);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unknown_event_is_unhandled() {
    let tokens = Arc::new(CountingTokens::default());
    let (runtime, mut rx) = runtime_with(tokens.clone(), None);

    let event = CallbackEvent::new(
        Source::account("a1"),
        EventKind::Unknown("typing".to_string()),
    );
    assert_eq!(runtime.process(&event).await.unwrap(), Outcome::Unhandled);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_token_failure_is_an_error() {
    let tokens = Arc::new(CountingTokens {
        fail: true,
        ..Default::default()
    });
    let (runtime, mut rx) = runtime_with(tokens, None);

    let result = runtime.process(&text(Source::account("a1"), "b")).await;
    assert!(matches!(result, Err(RuntimeError::Token(_))));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let failure = DeliveryError::Status {
        status: 500,
        body: "boom".to_string(),
    };
    let (runtime, _rx) = runtime_with(Arc::new(StaticToken("tok".into())), Some(failure.clone()));

    let outcome = runtime
        .process(&text(Source::account("a1"), "q"))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::DeliveryFailed(failure));
}

#[tokio::test]
async fn test_templates_disabled_echoes() {
    let mut config = config();
    config.dispatch.enable_templates = false;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runtime = WorksBotRuntime::with_parts(
        config,
        Arc::new(StaticToken("tok".into())),
        Arc::new(Recorder { tx, fail_with: None }),
    )
    .unwrap();

    runtime
        .process(&text(Source::account("a1"), "B"))
        .await
        .unwrap();

    let (payload, _) = rx.try_recv().unwrap();
    assert_eq!(
        payload.content,
        Some(ReplyContent::text("I see.\n(received: B)"))
    );
}

#[tokio::test]
async fn test_signed_callback_is_served_and_answered() {
    let mut config = config();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runtime = WorksBotRuntime::with_parts(
        config,
        Arc::new(StaticToken("tok".into())),
        Arc::new(Recorder { tx, fail_with: None }),
    )
    .unwrap();

    let handle = runtime.serve().await.unwrap();
    let body = r#"{"type":"join","source":{"roomId":"r1"}}"#;
    let resp = reqwest::Client::new()
        .post(format!("http://{}/callback", handle.local_addr()))
        .header(SIGNATURE_HEADER, sign("API", body.as_bytes()).unwrap())
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let (payload, _) = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload.target, ReplyTarget::room("r1"));
    assert_eq!(payload.content, Some(ReplyContent::text("Hi everyone!")));

    handle.stop().await;
}

#[tokio::test]
async fn test_from_config_against_mock_platform() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/b/API/server/token");
            then.status(200)
                .json_body(json!({"access_token": "tok-1", "expires_in": 86400}));
        })
        .await;
    let push_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/r/API/message/v1/bot/42/message/push")
                .header("authorization", "Bearer tok-1")
                .json_body(json!({
                    "botNo": 42,
                    "accountId": "a1",
                    "content": {"type": "text", "text": "address:Tokyo\nlat:35.6\nlon:139.7"}
                }));
            then.status(200);
        })
        .await;

    let mut config = config();
    config.works.api_base_url = server.base_url();
    config.works.auth_base_url = server.base_url();
    let runtime = WorksBotRuntime::from_config(&config).unwrap();

    let event = CallbackEvent::new(
        Source::account("a1"),
        EventKind::Message(MessageContent::Location(LocationContent {
            address: "Tokyo".to_string(),
            latitude: 35.6,
            longitude: 139.7,
        })),
    );
    assert_eq!(runtime.process(&event).await.unwrap(), Outcome::Delivered);
    assert_eq!(runtime.process(&event).await.unwrap(), Outcome::Delivered);

    token_mock.assert_hits_async(1).await;
    push_mock.assert_hits_async(2).await;
}

#[test]
fn test_from_config_rejects_invalid_config() {
    let mut config = config();
    config.works.bot_no = 0;
    assert!(matches!(
        WorksBotRuntime::from_config(&config),
        Err(RuntimeError::Config(_))
    ));
}
