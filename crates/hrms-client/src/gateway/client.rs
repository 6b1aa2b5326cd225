//! The gateway every backend request goes through.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::episode::{EpisodeOutcome, RefreshCoordinator, RefreshStats};
use super::error::{GatewayError, rejection_message};
use super::exchange::{HttpRefreshExchange, RefreshExchange};
use super::request::{ApiRequest, ApiResponse, RequestBody};
use crate::config::ClientConfig;
use crate::http_client::build_client;
use crate::session::{Credential, Session};

struct Inner {
    client: reqwest::Client,
    config: ClientConfig,
    session: Arc<Session>,
    exchange: Arc<dyn RefreshExchange>,
    coordinator: Arc<RefreshCoordinator>,
}

/// Authenticated request gateway.
///
/// Cheap to clone; clones share the session and the refresh episode.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

/// Builder for a [`Gateway`] with non-default collaborators.
pub struct GatewayBuilder {
    config: ClientConfig,
    session: Option<Arc<Session>>,
    client: Option<reqwest::Client>,
    exchange: Option<Arc<dyn RefreshExchange>>,
}

impl GatewayBuilder {
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn exchange(mut self, exchange: Arc<dyn RefreshExchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn build(self) -> Gateway {
        let client = self.client.unwrap_or_else(|| build_client(&self.config));
        let exchange = self.exchange.unwrap_or_else(|| {
            Arc::new(HttpRefreshExchange::new(client.clone(), self.config.clone()))
        });

        Gateway {
            inner: Arc::new(Inner {
                client,
                config: self.config,
                session: self.session.unwrap_or_default(),
                exchange,
                coordinator: Arc::new(RefreshCoordinator::new()),
            }),
        }
    }
}

impl Gateway {
    /// Create a gateway with the HTTP refresh exchange.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Self {
        Self::builder(config).session(session).build()
    }

    pub fn builder(config: ClientConfig) -> GatewayBuilder {
        GatewayBuilder {
            config,
            session: None,
            client: None,
            exchange: None,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn refresh_stats(&self) -> RefreshStats {
        self.inner.coordinator.stats()
    }

    /// Whether a refresh episode is running right now.
    pub fn refresh_in_flight(&self) -> bool {
        self.inner.coordinator.in_flight()
    }

    /// Send `request` with the current credential attached.
    ///
    /// A 401 on a non-auth route is recovered once: the request waits for the
    /// (shared) refresh episode and is reissued with the new credential. The
    /// retry's outcome is final.
    ///
    /// # Returns
    /// * `Ok(ApiResponse)` - 2xx response
    /// * `Err(GatewayError::Rejected)` - any other non-401 status, unchanged
    /// * `Err(GatewayError::AuthenticationExpired)` - 401 after the retry, or on `/auth/*`
    /// * `Err(GatewayError::SessionEnded)` - the refresh failed
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.route()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let (generation, credential) = self.inner.session.snapshot();
        let response = self.dispatch(&request, credential.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return finalize(response);
        }
        if request.is_auth_route() {
            debug!("401 on credential exchange route; not recovering");
            return Err(GatewayError::AuthenticationExpired {
                path: request.route(),
            });
        }

        // Resolves at once if another episode already rotated or cleared the
        // credential while this request was in the air.
        let retry_with = match self.join_refresh(generation).await {
            EpisodeOutcome::Refreshed(credential) => credential,
            EpisodeOutcome::Failed(reason) => return Err(GatewayError::SessionEnded(reason)),
        };

        debug!("Retrying request with refreshed credential");
        let response = self.dispatch(&request, Some(&retry_with)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Request still unauthorized after refresh");
            return Err(GatewayError::AuthenticationExpired {
                path: request.route(),
            });
        }
        finalize(response)
    }

    /// [`send`](Self::send) and deserialize the body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, GatewayError> {
        self.send(request).await?.json()
    }

    /// Refresh the session now, sharing any episode already in flight.
    pub async fn refresh_session(&self) -> Result<Credential, GatewayError> {
        match self.join_refresh(self.inner.session.generation()).await {
            EpisodeOutcome::Refreshed(credential) => Ok(credential),
            EpisodeOutcome::Failed(reason) => Err(GatewayError::SessionEnded(reason)),
        }
    }

    /// Drop in-memory session state and end-of-session callbacks.
    pub fn teardown(&self) {
        self.inner.session.teardown();
    }

    async fn join_refresh(&self, sent_generation: u64) -> EpisodeOutcome {
        let inner = &self.inner;
        inner
            .coordinator
            .join(
                &inner.session,
                &inner.exchange,
                inner.config.refresh_timeout,
                sent_generation,
            )
            .outcome()
            .await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<ApiResponse, GatewayError> {
        let mut url = self.inner.config.endpoint(request.path()).map_err(|e| {
            GatewayError::InvalidRequest(format!("cannot resolve '{}': {e}", request.path()))
        })?;
        if !request.query_pairs().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_pairs());
        }

        let mut builder = self.inner.client.request(request.method().clone(), url);
        if let Some(credential) = credential {
            builder = builder.bearer_auth(&credential.access_token);
        }
        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(_) => match request.build_form()? {
                Some(form) => builder.multipart(form),
                None => builder,
            },
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(
            %status,
            bytes = body.len(),
            authenticated = credential.is_some(),
            "Response received"
        );

        Ok(ApiResponse::new(status, headers, body, request.route()))
    }
}

fn finalize(response: ApiResponse) -> Result<ApiResponse, GatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(GatewayError::Rejected {
        status: response.status(),
        message: rejection_message(response.bytes()),
    })
}
