use crate::error::{Result, TourError};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create the HTTP client used for all upstream calls.
///
/// Calls are strictly sequential, so a single idle connection per host is enough.
pub fn create_custom_client(timeout_secs: u64, user_agent: &str) -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(1)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(timeout_secs))
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(user_agent)
        .use_rustls_tls()
        .build()
        .map_err(|e| TourError::Other(format!("Failed to create HTTP client: {}", e)))
}
