//! Authenticated request gateway.
//!
//! - [`ApiRequest`] / [`ApiResponse`]: replayable request description and buffered response
//! - [`RefreshExchange`]: trades the stored refresh token for a new credential
//! - [`Gateway`]: dispatch with bearer auth, 401 recovery and single-flight refresh

mod client;
mod episode;
mod error;
mod exchange;
mod request;

pub use client::{Gateway, GatewayBuilder};
pub use episode::RefreshStats;
pub use error::{GatewayError, RefreshError};
pub use exchange::{HttpRefreshExchange, RefreshExchange};
pub use request::{ApiRequest, ApiResponse, MultipartPart, RequestBody};

/// Prefix of the credential exchange routes. Requests under it never trigger
/// recovery.
pub const AUTH_ROUTE_PREFIX: &str = "/auth/";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";
