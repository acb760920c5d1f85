//! Command implementations.

pub mod auth;
pub mod books;
pub mod cart;
pub mod password;
pub mod review;

use bookbond_client::api::ApiClient;
use bookbond_client::config::ClientConfig;

/// Build an API client from the environment.
pub fn client() -> Result<ApiClient, Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    Ok(ApiClient::new(&config)?)
}
