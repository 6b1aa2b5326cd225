//! Bearer credentials and the claims carried inside them.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The credential pair the backend issued for this session.
///
/// `expires_at` is read from the access token's `exp` claim when the token is
/// a JWT; opaque tokens have no known expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Create a credential, decoding the expiry from the access token.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        let access_token = access_token.into();
        let expires_at = TokenClaims::decode(&access_token).and_then(|c| c.expires_at());
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// Produce the credential that replaces this one after a refresh.
    ///
    /// The backend may omit the refresh token when it does not rotate it, in
    /// which case the current one is kept.
    pub fn rotate(&self, access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self::new(
            access_token,
            refresh_token.or_else(|| self.refresh_token.clone()),
        )
    }

    /// Claims decoded from the access token, if it is a JWT.
    pub fn claims(&self) -> Option<TokenClaims> {
        TokenClaims::decode(&self.access_token)
    }

    #[inline]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The user embedded in the access token, `None` once the token expired.
    pub fn current_user(&self) -> Option<Value> {
        self.claims()?.current_user(Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Claims read from a JWT payload without verifying its signature.
///
/// The client cannot verify tokens (it has no key); it only reads them to
/// learn the expiry and the user. The backend remains the authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration timestamp (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// User object, when the backend nests it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl TokenClaims {
    /// Decode the payload segment of a compact JWT.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (_header, payload) = (segments.next()?, segments.next()?);
        segments.next()?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// `user` when present, otherwise the whole claim set.
    pub fn current_user(&self, now: DateTime<Utc>) -> Option<Value> {
        if self.is_expired_at(now) {
            return None;
        }
        if let Some(user) = &self.user {
            return Some(user.clone());
        }
        serde_json::to_value(self).ok()
    }
}
