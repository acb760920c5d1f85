//! Integration test support for the BookBond client.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the API server, then:
//! BOOKBOND_API_BASE_URL=http://localhost:8080/api/v1 \
//! BOOKBOND_TEST_EMAIL=test@example.com \
//! BOOKBOND_TEST_PASSWORD=secret \
//! cargo test -p bookbond-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Search, book detail, and related-books aggregation
//! - `account_cart` - Sign-in, cart mutations, and review round-trips
//!
//! Sessions use an in-memory token store so test runs never touch the
//! developer's persisted sign-in.

#![allow(clippy::expect_used)]

use bookbond_client::api::ApiClient;
use bookbond_client::config::ClientConfig;
use bookbond_client::session::MemoryTokenStore;
use bookbond_core::Email;

/// A client configured from the environment, with no persisted session.
#[must_use]
pub fn anonymous_client() -> ApiClient {
    let config = ClientConfig::from_env().expect("invalid client configuration");
    ApiClient::with_store(&config, Box::new(MemoryTokenStore::default()))
        .expect("failed to build API client")
}

/// A client signed in with the `BOOKBOND_TEST_EMAIL` /
/// `BOOKBOND_TEST_PASSWORD` account.
///
/// # Panics
///
/// Panics when the env vars are unset or sign-in fails; live tests
/// require them.
pub async fn signed_in_client() -> ApiClient {
    let email = std::env::var("BOOKBOND_TEST_EMAIL").expect("BOOKBOND_TEST_EMAIL not set");
    let password = std::env::var("BOOKBOND_TEST_PASSWORD").expect("BOOKBOND_TEST_PASSWORD not set");

    let client = anonymous_client();
    client
        .sign_in(
            Email::parse(&email).expect("invalid BOOKBOND_TEST_EMAIL"),
            &password,
        )
        .await
        .expect("sign-in failed; is the test account activated?");
    client
}
