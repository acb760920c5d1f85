//! Cache types for catalog API responses.

use crate::types::{Book, Review};

/// Cached value types.
///
/// Only catalog reads are cached; the cart is mutable server state and is
/// always fetched fresh.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Book(Box<Book>),
    Books(Vec<Book>),
    Reviews(Vec<Review>),
}
