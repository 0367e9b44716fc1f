//! Shared construction of outbound HTTP clients

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Builds an HTTP client with connection pooling and a tracing span per request.
///
/// Wikipedia rejects requests without a descriptive user agent, so every
/// client identifies itself with the crate name and version.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized
pub fn build(timeout: Duration) -> Result<ClientWithMiddleware, reqwest::Error> {
    let reqwest_client = Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
        .user_agent(format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;

    Ok(ClientBuilder::new(reqwest_client)
        .with(TracingMiddleware::default())
        .build())
}
