//! Callback ingress.
//!
//! ```text
//! GET  <health_path>    → 200 "WorksBot is running"
//! POST <callback_path>  → signature check ─✗→ 401
//!                              │✓
//!                         parse event ─✗→ 400
//!                              │✓
//!                         spawn handler, 200 at once
//! ```
//!
//! The acknowledgement never waits for the handler; what happens to the
//! reply afterwards is the handler's business.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use worksbot_core::{CallbackEvent, parse_callback_event};

use crate::error::TransportResult;
use crate::settings::IngressSettings;
use crate::signature::{self, SIGNATURE_HEADER};

/// Body of the liveness response.
pub const HEALTH_TEXT: &str = "WorksBot is running";

/// Receives authenticated, decoded callback events.
#[async_trait]
pub trait CallbackHandler: Send + Sync + 'static {
    /// Processes one event. Runs detached from the HTTP request.
    async fn handle(&self, event: CallbackEvent);
}

struct IngressState {
    secret: String,
    handler: Arc<dyn CallbackHandler>,
}

/// Builds the ingress router.
pub fn callback_router(settings: &IngressSettings, handler: Arc<dyn CallbackHandler>) -> Router {
    let state = Arc::new(IngressState {
        secret: settings.secret.clone(),
        handler,
    });

    let router = if settings.callback_path == settings.health_path {
        Router::new().route(&settings.callback_path, get(health).post(callback))
    } else {
        Router::new()
            .route(&settings.health_path, get(health))
            .route(&settings.callback_path, post(callback))
    };
    router.with_state(state)
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

async fn callback(
    State(state): State<Arc<IngressState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = signature::verify(&state.secret, &body, provided) {
        warn!(error = %e, len = body.len(), "Rejected callback");
        return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
    }

    let event = match parse_callback_event(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Malformed callback body");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    debug!(event_type = event.event_type(), "Callback accepted");
    let handler = state.handler.clone();
    tokio::spawn(async move {
        handler.handle(event).await;
    });

    StatusCode::OK.into_response()
}

/// Handle to a running listener. Dropping it stops the listener.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for the serve loop to exit.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Binds `addr` and serves `router` until the handle is stopped.
pub async fn serve(addr: &str, router: Router) -> TransportResult<ListenerHandle> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();

    info!(addr = %local_addr, "HTTP server listening");

    let token = shutdown.clone();
    let task = tokio::spawn(async move {
        let server = axum::serve(listener, router);
        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!(error = %e, "HTTP server error");
                }
            }
            () = token.cancelled() => {
                info!(addr = %local_addr, "HTTP server shutting down");
            }
        }
    });

    Ok(ListenerHandle {
        local_addr,
        shutdown,
        task: Some(task),
    })
}
