//! Request orchestration.
//!
//! ```text
//!  callback ──▶ Dispatcher::classify ──None──────────────▶ Unhandled
//!                     │ Some(payload)
//!                     ├── no content ─────────────────────▶ NoContent
//!                     ▼
//!               TokenSource::token ──Err──────────────────▶ Err(RuntimeError::Token)
//!                     │
//!                     ▼
//!               Deliver::deliver ──Err(e)─────────────────▶ DeliveryFailed(e)
//!                     │ Ok
//!                     ▼
//!                 Delivered
//! ```
//!
//! Each callback is processed once; a failed push is logged and dropped.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use worksbot_runtime::WorksBotRuntime;
//!
//! let runtime = WorksBotRuntime::builder()
//!     .config_file("worksbot.toml")
//!     .profile("production")
//!     .build()?;
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use worksbot_core::{CallbackEvent, Dispatcher};
use worksbot_transport::{
    CallbackHandler, Deliver, DeliveryError, JwtTokenIssuer, ListenerHandle, TokenSource,
    WorksApiClient, build_http_client, callback_router, serve,
};

use crate::config::{ConfigLoader, WorksBotConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// What became of one callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The event type or message content has no reply.
    Unhandled,
    /// Understood, but nothing to send.
    NoContent,
    /// The reply was pushed.
    Delivered,
    /// The push was rejected or did not reach the platform.
    DeliveryFailed(DeliveryError),
}

/// The assembled bot: configuration, dispatcher and both outbound seams.
#[derive(Clone)]
pub struct WorksBotRuntime {
    config: Arc<WorksBotConfig>,
    dispatcher: Arc<Dispatcher>,
    tokens: Arc<dyn TokenSource>,
    deliverer: Arc<dyn Deliver>,
}

impl WorksBotRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Validates `config`, installs logging and builds the HTTP collaborators.
    pub fn from_config(config: &WorksBotConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        validate_config(config)?;

        let api = config.works.api_settings()?;
        let client = build_http_client(api.timeout)?;
        let tokens = JwtTokenIssuer::new(&api, client.clone())?;
        let deliverer = WorksApiClient::new(&api, client);

        info!(
            bot_no = api.bot_no,
            push_url = deliverer.push_url(),
            endpoint_version = ?api.endpoint_version,
            templates = config.dispatch.enable_templates,
            "Runtime initialized from configuration"
        );

        Self::with_parts(config.clone(), Arc::new(tokens), Arc::new(deliverer))
    }

    /// Assembles a runtime around caller-provided collaborators.
    ///
    /// The configuration is taken as is; only the template catalog is
    /// checked.
    pub fn with_parts(
        config: WorksBotConfig,
        tokens: Arc<dyn TokenSource>,
        deliverer: Arc<dyn Deliver>,
    ) -> RuntimeResult<Self> {
        let dispatcher = Dispatcher::new(
            config.dispatch.features(),
            config.dispatch.replies.clone(),
            &config.dispatch.image_host,
        );
        dispatcher.catalog().verify()?;

        Ok(Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            tokens,
            deliverer,
        })
    }

    pub fn config(&self) -> &WorksBotConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Classifies `event` and pushes the reply, if any.
    ///
    /// Only a token failure is an error; a failed push is reported as
    /// [`Outcome::DeliveryFailed`].
    pub async fn process(&self, event: &CallbackEvent) -> RuntimeResult<Outcome> {
        let Some(payload) = self.dispatcher.classify(event) else {
            return Ok(Outcome::Unhandled);
        };
        if !payload.has_content() {
            debug!(target_id = payload.target.id(), "Nothing to send");
            return Ok(Outcome::NoContent);
        }

        let token = self.tokens.token().await?;

        match self.deliverer.deliver(&payload, &token).await {
            Ok(()) => {
                info!(
                    target_id = payload.target.id(),
                    room = payload.target.is_room(),
                    "Reply delivered"
                );
                Ok(Outcome::Delivered)
            }
            Err(e) => {
                warn!(
                    target_id = payload.target.id(),
                    error = %e,
                    "Reply delivery failed"
                );
                Ok(Outcome::DeliveryFailed(e))
            }
        }
    }

    /// Binds the callback listener.
    pub async fn serve(&self) -> RuntimeResult<ListenerHandle> {
        let router = callback_router(&self.config.ingress_settings(), Arc::new(self.clone()));
        Ok(serve(&self.config.server.bind_addr(), router).await?)
    }

    /// Serves until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.run_until(wait_for_shutdown()).await
    }

    /// Serves until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.serve().await?;
        info!(
            addr = %handle.local_addr(),
            callback_path = %self.config.server.callback_path,
            "WorksBot is now running. Press Ctrl+C to stop."
        );

        shutdown.await;

        handle.stop().await;
        info!("Runtime stopped");
        Ok(())
    }
}

#[async_trait]
impl CallbackHandler for WorksBotRuntime {
    async fn handle(&self, event: CallbackEvent) {
        let span = info_span!(
            "callback",
            request_id = %Uuid::new_v4(),
            event_type = event.event_type(),
        );

        async {
            match self.process(&event).await {
                Ok(outcome) => debug!(?outcome, "Callback processed"),
                Err(e) => error!(error = %e, "Callback processing failed"),
            }
        }
        .instrument(span)
        .await;
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to register SIGTERM handler");

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Received Ctrl+C, shutting down");
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration and builds a [`WorksBotRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: WorksBotConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration without building anything.
    pub fn load(self) -> RuntimeResult<WorksBotConfig> {
        Ok(self.config_loader.load()?)
    }

    pub fn build(self) -> RuntimeResult<WorksBotRuntime> {
        let config = self.config_loader.load()?;
        WorksBotRuntime::from_config(&config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
