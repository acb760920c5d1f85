//! Cart operations (not cached - mutable server state).
//!
//! The server owns the cart; every mutation is followed by a fresh
//! `get_cart` in the mirror layer so local state reconverges with whatever
//! the server actually applied.

use bookbond_core::{BookId, CartItemId};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::types::{AddToCart, Cart, CartItem, MessageAck, UpdateQuantity};

use super::ApiClient;

/// Server-enforced bounds on a single cart line, checked locally first.
const MIN_QUANTITY: u32 = 1;
const MAX_QUANTITY: u32 = 10;

fn validate_quantity(quantity: u32) -> Result<(), ApiError> {
    if (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY}, got {quantity}"
        )))
    }
}

impl ApiClient {
    /// Fetch the authoritative cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.execute(self.get("/carts")).await
    }

    /// Add a book to the cart.
    ///
    /// The server answers with an ack, not the updated cart; callers
    /// re-fetch via [`get_cart`](Self::get_cart) to observe the result.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an out-of-range quantity, or a
    /// network / server error from the request.
    #[instrument(skip(self), fields(book_id = %book_id, quantity))]
    pub async fn add_to_cart(&self, book_id: BookId, quantity: u32) -> Result<(), ApiError> {
        validate_quantity(quantity)?;

        let payload = AddToCart { book_id, quantity };
        let ack: MessageAck = self.execute(self.post("/carts").json(&payload)).await?;
        debug!(message = %ack.message, "cart add acknowledged");
        Ok(())
    }

    /// Commit a new quantity for a cart item.
    ///
    /// Returns the updated item as the server recorded it; the server may
    /// have clamped the requested quantity against stock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an out-of-range quantity, or a
    /// network / server error from the request.
    #[instrument(skip(self), fields(item_id = %item_id, quantity))]
    pub async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        validate_quantity(quantity)?;

        let payload = UpdateQuantity { quantity };
        self.execute(
            self.patch(&format!("/carts/items/{item_id}")).json(&payload),
        )
        .await
    }

    /// Remove an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        self.execute_raw(self.delete(&format!("/carts/items/{item_id}")))
            .await?;
        Ok(())
    }
}
