//! BookBond Core - Shared types library.
//!
//! This crate provides common types used across all BookBond components:
//! - `client` - Typed HTTP client for the BookBond API
//! - `cli` - Terminal front end for the storefront flows
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
