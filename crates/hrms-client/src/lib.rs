//! HRMS backend client.
//!
//! The [`Gateway`] is the only way requests reach the backend. It attaches the
//! current bearer token, and when the backend answers `401` it refreshes the
//! session once for every request that failed concurrently, then retries each
//! of them exactly once.
//!
//! # Architecture
//!
//! - [`Session`]: owns the current [`Credential`] and the session event bus
//! - [`RefreshExchange`]: backend call that trades a refresh token for a new credential
//! - [`Gateway`]: request dispatch plus single-flight recovery
//! - [`AuthService`]: login, logout and token introspection
//! - [`EmployeeService`], [`AttendanceService`]: typed resource endpoints

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod logging;
pub mod services;
pub mod session;

pub use auth::{AuthError, AuthService, LoginOutcome};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use gateway::{
    ApiRequest, ApiResponse, Gateway, GatewayBuilder, GatewayError, HttpRefreshExchange,
    MultipartPart, RefreshError, RefreshExchange, RefreshStats, RequestBody,
};
pub use services::{AttendanceService, Company, EmployeePayload, EmployeeService};
pub use session::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, Session,
    SessionEndReason, SessionEvent, StoreError, TokenClaims,
};
