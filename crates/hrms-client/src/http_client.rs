use std::sync::OnceLock;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::config::ClientConfig;

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Headers the backend expects on every call, mirroring an XHR from the web console.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Build the `reqwest::Client` shared by the gateway and the refresh exchange.
pub fn build_client(config: &ClientConfig) -> reqwest::Client {
    install_rustls_provider();

    let mut builder = reqwest::Client::builder()
        .default_headers(default_headers())
        .user_agent(config.user_agent.clone());

    if !config.request_timeout.is_zero() {
        builder = builder.timeout(config.request_timeout);
    }

    builder.build().unwrap_or_else(|error| {
        warn!(
            error = %error,
            "Failed to create configured HTTP client; falling back to reqwest defaults"
        );
        reqwest::Client::new()
    })
}
