//! BookBond API client.
//!
//! Uses `reqwest` for HTTP with the API's `{"data": ...}` / `{"error": ...}`
//! envelopes. Catalog reads are cached using `moka` (5-minute TTL); cart and
//! auth operations always go to the server.
//!
//! The bearer token is read from the shared [`Session`] on every request,
//! so sign-in on one clone of the client is visible to all others.

mod auth;
mod books;
mod cache;
mod carts;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::{FileTokenStore, Session, SessionState, TokenStore};
use crate::types::{Envelope, ErrorEnvelope};

use cache::CacheValue;

/// How long catalog reads stay fresh before being re-fetched.
const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;

/// Client for the BookBond API.
///
/// Cheaply cloneable; all clones share the HTTP connection pool, the
/// session credential, and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    session: RwLock<Session>,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a client from configuration, restoring any persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let store = FileTokenStore::new(config.token_file.clone());
        Self::with_store(config, Box::new(store))
    }

    /// Create a client with a caller-supplied token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_store(
        config: &ClientConfig,
        store: Box<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                session: RwLock::new(Session::restore(store)),
                cache,
            }),
        })
    }

    /// Current session lifecycle state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.inner
            .session
            .read()
            .map_or(SessionState::Anonymous, |session| session.state())
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Attach the session's bearer token, if one is held.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .inner
            .session
            .read()
            .ok()
            .and_then(|session| session.token().map(|t| t.expose_secret().to_string()));

        match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http.get(self.url(path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http.post(self.url(path)))
    }

    fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http.put(self.url(path)))
    }

    fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http.patch(self.url(path)))
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http.delete(self.url(path)))
    }

    /// Send a request and decode the success envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute_raw(request).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    /// Send a request, check the status, and return the raw body.
    ///
    /// Mutations that answer 204 (or a body the caller ignores) use this
    /// directly.
    async fn execute_raw(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map_or_else(|_| body.chars().take(200).collect(), |e| e.error);

        match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                // The session credential was rejected. Mark it expired so the
                // caller can offer re-authentication; the token is not
                // silently discarded.
                if let Ok(mut session) = self.inner.session.write() {
                    session.expire();
                }
                tracing::warn!("session rejected by server: {message}");
                Err(ApiError::Unauthorized(message))
            }
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            _ => {
                tracing::error!(status = %status, "API request failed: {message}");
                Err(ApiError::Server {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    // =========================================================================
    // Cache Helpers
    // =========================================================================

    async fn cache_get(&self, key: &str) -> Option<CacheValue> {
        self.inner.cache.get(key).await
    }

    async fn cache_insert(&self, key: String, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    async fn cache_invalidate(&self, key: &str) {
        self.inner.cache.invalidate(key).await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Run a closure against the shared session.
    pub(crate) fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.inner.session.write().ok().map(|mut session| f(&mut session))
    }
}
