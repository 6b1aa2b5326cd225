//! The backend call that renews a credential.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::REFRESH_PATH;
use super::error::RefreshError;
use crate::config::ClientConfig;
use crate::session::Credential;

/// Trades the current credential's refresh token for a new credential.
///
/// Implementations must not go through the [`Gateway`](super::Gateway): a 401
/// from the exchange is a failed refresh, never a reason to refresh again.
#[async_trait]
pub trait RefreshExchange: Send + Sync {
    /// Perform one refresh.
    ///
    /// # Arguments
    /// * `current` - The credential being replaced, if any
    ///
    /// # Returns
    /// * `Ok(Credential)` - The replacement credential
    /// * `Err(...)` - Refresh failed; the session is over
    async fn refresh(&self, current: Option<&Credential>) -> Result<Credential, RefreshError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// `POST /auth/refresh` with `{ "refreshToken": ... }`.
pub struct HttpRefreshExchange {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpRefreshExchange {
    pub fn new(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RefreshExchange for HttpRefreshExchange {
    #[instrument(skip(self, current))]
    async fn refresh(&self, current: Option<&Credential>) -> Result<Credential, RefreshError> {
        let Some(current) = current.filter(|c| c.has_refresh_token()) else {
            return Err(RefreshError::MissingRefreshToken);
        };
        let refresh_token = current.refresh_token.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(self.config.endpoint(REFRESH_PATH)?)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Rejected { status });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RefreshError::Malformed("No access token received".to_string()))?;

        debug!(
            rotated_refresh_token = body.refresh_token.is_some(),
            "Refresh exchange succeeded"
        );
        Ok(current.rotate(access_token, body.refresh_token))
    }
}
