//! Domain types for the BookBond API.
//!
//! Field names track the server's JSON exactly. All success bodies arrive
//! wrapped in a `{"data": ...}` envelope and error bodies in
//! `{"error": "..."}`; both envelopes live here too.
//!
//! Reviews are the one irregular surface: the server serializes them with
//! Go-style capitalized keys (`ID`, `Content`, ...), handled with explicit
//! renames.

use bookbond_core::{BookId, CartId, CartItemId, Email, Price, Rating, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Envelopes
// =============================================================================

/// Success envelope: `{"data": <payload>}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error envelope: `{"error": "<message>"}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// Ack payload used by mutations that return only a message.
#[derive(Debug, Deserialize)]
pub struct MessageAck {
    pub message: String,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A book in the catalog.
///
/// Immutable from the client's perspective; fetched, never locally mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Price,
    /// Tags drive the related-books lookup on the detail view.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image_url: String,
    pub pages: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Search filters for `GET /books/search`.
///
/// All fields are optional; an empty filter lists the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct BookSearch {
    /// Free-text query matched against title, author, and description.
    pub query: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Matches books carrying any of these tags.
    pub tags: Vec<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub in_stock: Option<bool>,
}

impl BookSearch {
    /// A filter matching books with the given tag.
    #[must_use]
    pub fn by_tag(tag: &str) -> Self {
        Self {
            tags: vec![tag.to_string()],
            ..Self::default()
        }
    }

    /// A free-text query filter.
    #[must_use]
    pub fn by_query(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            ..Self::default()
        }
    }

    /// Render as query-string pairs, omitting unset filters.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        if let Some(author) = &self.author {
            pairs.push(("author", author.clone()));
        }
        for tag in &self.tags {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.amount().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.amount().to_string()));
        }
        if let Some(in_stock) = self.in_stock {
            pairs.push(("in_stock", in_stock.to_string()));
        }
        pairs
    }
}

// =============================================================================
// Review Types
// =============================================================================

/// A customer review of a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "ID")]
    pub id: ReviewId,
    #[serde(rename = "UserID")]
    pub user_id: UserId,
    #[serde(rename = "BookID")]
    pub book_id: BookId,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Rating")]
    pub rating: Rating,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for submitting a new review.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub content: String,
    pub rating: Rating,
}

// =============================================================================
// Cart Types
// =============================================================================

/// The authoritative cart as returned by `GET /carts`.
///
/// Replaced wholesale after every successful mutation round-trip; only the
/// editable mirror is patched locally.
#[derive(Debug, Clone, Deserialize)]
pub struct Cart {
    pub cart_id: CartId,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Sum of line totals across all items.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .map(|item| item.price.times(item.quantity))
            .sum()
    }

    /// Look up an item by its id.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// A cart line with denormalized book display fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    #[serde(default)]
    pub cover_image_url: String,
    pub stock: i64,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /carts`.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCart {
    pub book_id: BookId,
    pub quantity: u32,
}

/// Payload for `PATCH /carts/items/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantity {
    pub quantity: u32,
}

// =============================================================================
// Auth Types
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub is_active: bool,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up payload for `POST /authentication/user`.
#[derive(Debug, Clone, Serialize)]
pub struct SignUp {
    pub username: String,
    pub email: Email,
    pub password: String,
}

/// Sign-in payload for `POST /authentication/token`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

/// Response to sign-up: the created user plus its activation token.
///
/// The user object arrives nested under a capitalized `User` key, the
/// same Go-serialization irregularity as [`Review`].
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    #[serde(rename = "User")]
    pub user: User,
    /// Plain activation token; also emailed to the user.
    pub token: String,
}

/// Payload for `POST /password/reset`.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub token: String,
    pub new_password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_book_deserializes_from_api_json() {
        let json = r#"{
            "data": {
                "id": 42,
                "title": "The Go Programming Language",
                "author": "Donovan",
                "isbn": "9780134190440",
                "price": 39.99,
                "tags": ["go", "programming"],
                "description": "A reference.",
                "cover_image_url": "https://img.example/42.jpg",
                "pages": 380,
                "stock": 12,
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-02T00:00:00Z",
                "version": 1
            }
        }"#;
        let envelope: Envelope<Book> = serde_json::from_str(json).unwrap();
        let book = envelope.data;
        assert_eq!(book.id, BookId::new(42));
        assert_eq!(book.tags, vec!["go", "programming"]);
        assert_eq!(book.price.display(), "$39.99");
    }

    #[test]
    fn test_book_missing_tags_defaults_empty() {
        let json = r#"{
            "id": 1, "title": "t", "author": "a", "isbn": "i", "price": 1.0,
            "description": "", "pages": 1, "stock": 0,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z", "version": 1
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert!(book.tags.is_empty());
        assert!(book.cover_image_url.is_empty());
    }

    #[test]
    fn test_review_uses_capitalized_keys() {
        let json = r#"{
            "ID": 3, "UserID": 9, "BookID": 42,
            "Content": "Great", "Rating": 5,
            "CreatedAt": "2025-06-01T10:00:00Z",
            "UpdatedAt": "2025-06-01T10:00:00Z"
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.id, ReviewId::new(3));
        assert_eq!(review.rating.stars(), 5);
        assert_eq!(review.content, "Great");
    }

    #[test]
    fn test_cart_subtotal() {
        let json = r#"{
            "cart_id": 1,
            "items": [
                {"id": 7, "cart_id": 1, "book_id": 42, "title": "t", "author": "a",
                 "price": 10.50, "stock": 5, "quantity": 2,
                 "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"},
                {"id": 8, "cart_id": 1, "book_id": 43, "title": "u", "author": "b",
                 "price": 5.00, "stock": 3, "quantity": 1,
                 "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"}
            ]
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.subtotal().display(), "$26.00");
        assert!(cart.item(CartItemId::new(7)).is_some());
        assert!(cart.item(CartItemId::new(99)).is_none());
    }

    #[test]
    fn test_message_ack_envelope() {
        // Mutations like POST /carts answer with a message instead of the
        // mutated resource
        let json = r#"{"data": {"message": "cart created or updated"}}"#;
        let envelope: Envelope<MessageAck> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.message, "cart created or updated");
    }

    #[test]
    fn test_by_tag_builds_single_tag_filter() {
        let pairs = BookSearch::by_tag("systems").to_query_pairs();
        assert_eq!(pairs, vec![("tag", "systems".to_string())]);
    }

    #[test]
    fn test_search_query_pairs() {
        let search = BookSearch {
            query: Some("rust".to_string()),
            tags: vec!["systems".to_string(), "programming".to_string()],
            in_stock: Some(true),
            ..BookSearch::default()
        };
        let pairs = search.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("query", "rust".to_string()),
                ("tag", "systems".to_string()),
                ("tag", "programming".to_string()),
                ("in_stock", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_registered_user_nests_user_under_capitalized_key() {
        // Shape as emitted by the server's registration handler
        let json = r#"{
            "data": {
                "User": {
                    "id": 1, "username": "amy", "email": "amy@example.com",
                    "is_active": false, "role_id": 1,
                    "created_at": "2025-01-01T00:00:00Z",
                    "updated_at": "2025-01-01T00:00:00Z"
                },
                "token": "activation-token"
            }
        }"#;
        let envelope: Envelope<RegisteredUser> = serde_json::from_str(json).unwrap();
        let registered = envelope.data;
        assert_eq!(registered.user.username, "amy");
        assert!(!registered.user.is_active);
        assert_eq!(registered.token, "activation-token");
    }
}
