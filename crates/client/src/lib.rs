//! BookBond client library.
//!
//! A typed client for the BookBond book store API: authentication, catalog
//! browsing and search, reviews, and a shopping cart with a locally editable
//! mirror. The server owns all business logic; this crate is the thin
//! presentation-side layer that talks to it.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - reqwest-based HTTP client; attaches the bearer
//!   token from the shared [`session::Session`], decodes the API's `{data}`
//!   envelope, and caches catalog reads via `moka` (5-minute TTL)
//! - [`related`] - related-books aggregation for the book detail view
//! - [`mirror`] - the editable cart mirror and its commit state machine
//! - [`view`] - per-dependency display states (loading / ready / failed)
//!
//! # Example
//!
//! ```rust,ignore
//! use bookbond_client::api::ApiClient;
//! use bookbond_client::config::ClientConfig;
//! use bookbond_client::related;
//!
//! let config = ClientConfig::from_env()?;
//! let client = ApiClient::new(&config)?;
//!
//! let book = client.get_book(BookId::new(42)).await?;
//! let related = related::related_books(&client, &book).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod mirror;
pub mod related;
pub mod session;
pub mod types;
pub mod view;
