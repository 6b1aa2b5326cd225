//! Login, logout and token introspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::gateway::{ApiRequest, Gateway, GatewayError, LOGIN_PATH, LOGOUT_PATH};
use crate::session::{Credential, SessionEndReason};

/// Errors from the auth service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend refused the email/password pair.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Login response did not include an access token")]
    MissingAccessToken,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub credential: Credential,
    /// User returned by the backend, or decoded from the access token.
    pub user: Option<Value>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<Value>,
}

/// Authentication operations on top of a [`Gateway`].
#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Log in with email and password and install the issued credential.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest { email, password })?;

        let body: LoginResponse = match self.gateway.send_json(request).await {
            Ok(body) => body,
            Err(GatewayError::AuthenticationExpired { .. }) => {
                return Err(AuthError::InvalidCredentials("Login failed".to_string()));
            }
            Err(GatewayError::Rejected { status, message }) if status.is_client_error() => {
                let message = if message.is_empty() {
                    "Login failed".to_string()
                } else {
                    message
                };
                return Err(AuthError::InvalidCredentials(message));
            }
            Err(e) => return Err(e.into()),
        };

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingAccessToken)?;
        let credential = Credential::new(access_token, body.refresh_token);
        let user = body.user.or_else(|| credential.current_user());

        let generation = self.gateway.session().establish(credential.clone()).await;
        info!(generation, expires_at = ?credential.expires_at, "Logged in");

        Ok(LoginOutcome { credential, user })
    }

    /// End the session locally and tell the backend, best-effort.
    ///
    /// The local credential is cleared even when the backend call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.gateway.session().current_credential().is_some() {
            if let Err(e) = self.gateway.send(ApiRequest::post(LOGOUT_PATH)).await {
                warn!(error = %e, "Backend logout failed (non-fatal)");
            }
        }
        self.gateway.session().end(SessionEndReason::LoggedOut).await;
    }

    /// Refresh the credential now.
    pub async fn refresh(&self) -> Result<Credential, AuthError> {
        Ok(self.gateway.refresh_session().await?)
    }

    /// Access token valid, or a refresh token available.
    pub fn is_authenticated(&self) -> bool {
        self.gateway.session().is_authenticated()
    }

    /// The access token carries an `exp` claim that is still in the future.
    pub fn is_token_valid(&self) -> bool {
        self.gateway
            .session()
            .current_credential()
            .is_some_and(|c| c.expires_at.is_some() && !c.is_expired())
    }

    /// The user decoded from the current access token.
    pub fn current_user(&self) -> Option<Value> {
        self.gateway.session().current_credential()?.current_user()
    }

    pub fn access_token(&self) -> Option<String> {
        self.gateway
            .session()
            .current_credential()
            .map(|c| c.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.gateway
            .session()
            .current_credential()
            .and_then(|c| c.refresh_token)
    }
}
