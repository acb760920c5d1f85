//! Local cart mirror with optimistic reconciliation.
//!
//! [`CartMirror`] holds the client-side copy of the remote cart. Quantity
//! edits patch the mirror immediately so the presentation layer never
//! blocks on the network; the server write happens later as a single
//! commit, and the commit's concluding refetch replaces the mirror
//! wholesale. The server copy is authoritative: the mirror is never
//! patched piecemeal from a commit response.
//!
//! Commits are two-phase so the in-flight window is explicit. The caller
//! takes a [`CommitTicket`] when the write starts and hands it back with
//! the outcome when the write settles. Each ticket carries the mirror
//! epoch it was minted under; wholesale replacement bumps the epoch, so a
//! ticket from a superseded view of the cart is discarded on return
//! instead of clobbering newer state.

use std::collections::HashMap;

use bookbond_core::{BookId, CartItemId};
use tracing::{debug, instrument, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{Cart, CartItem};

/// Where an individual cart line stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemEditState {
    /// In sync with the last refetch; no edit pending.
    #[default]
    Viewing,
    /// Locally edited; the new quantity has not been sent yet.
    Editing,
    /// A quantity write for this line is in flight.
    Committing,
}

/// Proof of an in-flight write, returned by [`CartMirror::begin_commit`]
/// and consumed by [`CartMirror::complete_commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTicket {
    item_id: CartItemId,
    quantity: u32,
    epoch: u64,
}

impl CommitTicket {
    pub const fn item_id(&self) -> CartItemId {
        self.item_id
    }

    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Client-side cart state, reconciled against the server copy.
#[derive(Debug, Default)]
pub struct CartMirror {
    cart: Option<Cart>,
    edits: HashMap<CartItemId, ItemEditState>,
    errors: HashMap<CartItemId, String>,
    epoch: u64,
}

impl CartMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current local view of the cart, if one has been loaded.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    #[must_use]
    pub fn item_state(&self, item_id: CartItemId) -> ItemEditState {
        self.edits.get(&item_id).copied().unwrap_or_default()
    }

    /// The error recorded for a line by its last failed write, if any.
    #[must_use]
    pub fn item_error(&self, item_id: CartItemId) -> Option<&str> {
        self.errors.get(&item_id).map(String::as_str)
    }

    /// Replace the mirror wholesale with a fresh server copy.
    ///
    /// All per-item edit state and recorded errors are dropped and the
    /// epoch advances, invalidating any outstanding [`CommitTicket`].
    pub fn replace(&mut self, cart: Cart) {
        self.cart = Some(cart);
        self.edits.clear();
        self.errors.clear();
        self.epoch += 1;
    }

    /// Forget the cart entirely, e.g. on sign-out.
    pub fn reset(&mut self) {
        self.cart = None;
        self.edits.clear();
        self.errors.clear();
        self.epoch += 1;
    }

    /// Apply a quantity edit to the local copy immediately.
    ///
    /// The server is not contacted; the line moves to
    /// [`ItemEditState::Editing`] until a commit runs. Concurrent edits to
    /// the same line resolve last-write-wins by arrival order. Editing an
    /// unknown line is a no-op.
    pub fn edit_quantity(&mut self, item_id: CartItemId, quantity: u32) {
        let Some(cart) = self.cart.as_mut() else {
            return;
        };
        let Some(item) = cart.items.iter_mut().find(|i| i.id == item_id) else {
            return;
        };
        item.quantity = quantity;
        self.edits.insert(item_id, ItemEditState::Editing);
        self.errors.remove(&item_id);
    }

    /// Start committing a line's locally edited quantity.
    ///
    /// Returns `None` if the line is unknown or already has a write in
    /// flight. The caller performs the server write and reports back via
    /// [`complete_commit`](Self::complete_commit).
    pub fn begin_commit(&mut self, item_id: CartItemId) -> Option<CommitTicket> {
        if self.item_state(item_id) == ItemEditState::Committing {
            return None;
        }
        let quantity = self
            .cart
            .as_ref()?
            .items
            .iter()
            .find(|i| i.id == item_id)?
            .quantity;
        self.edits.insert(item_id, ItemEditState::Committing);
        Some(CommitTicket {
            item_id,
            quantity,
            epoch: self.epoch,
        })
    }

    /// Conclude a commit with the outcome of the server write.
    ///
    /// On success the refetched cart replaces the mirror wholesale. On
    /// failure the line keeps its optimistic quantity, returns to
    /// [`ItemEditState::Viewing`], and the failure is recorded against the
    /// line for the presentation layer to surface. A ticket minted under a
    /// superseded epoch is discarded either way.
    #[instrument(skip(self, outcome), fields(item_id = %ticket.item_id))]
    pub fn complete_commit(&mut self, ticket: CommitTicket, outcome: Result<Cart, ApiError>) {
        if ticket.epoch != self.epoch {
            debug!("discarding commit outcome from superseded cart view");
            return;
        }
        match outcome {
            Ok(cart) => self.replace(cart),
            Err(err) => self.fail_commit(ticket.item_id, &err),
        }
    }

    fn fail_commit(&mut self, item_id: CartItemId, err: &ApiError) {
        warn!(error = %err, "quantity update failed; keeping local value");
        self.edits.insert(item_id, ItemEditState::Viewing);
        self.errors.insert(item_id, err.to_string());
    }

    /// Conclude a removal with the outcome of the server delete.
    ///
    /// Removal skips the edit buffer: on success the refetched cart
    /// replaces the mirror, on failure the line stays and the error is
    /// recorded against it.
    pub fn complete_remove(
        &mut self,
        item_id: CartItemId,
        ticket_epoch: u64,
        outcome: Result<Cart, ApiError>,
    ) {
        if ticket_epoch != self.epoch {
            return;
        }
        match outcome {
            Ok(cart) => self.replace(cart),
            Err(err) => {
                self.errors.insert(item_id, err.to_string());
            }
        }
    }

    /// The epoch a removal started under; pass back to
    /// [`complete_remove`](Self::complete_remove).
    #[must_use]
    pub const fn current_epoch(&self) -> u64 {
        self.epoch
    }
}

/// Server operations a cart reconciliation run needs.
///
/// [`ApiClient`] is the production implementation; tests script their own.
pub trait CartBackend {
    fn fetch_cart(&self) -> impl Future<Output = Result<Cart, ApiError>> + Send;
    fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<CartItem, ApiError>> + Send;
    fn remove_item(&self, item_id: CartItemId) -> impl Future<Output = Result<(), ApiError>> + Send;
    fn add_to_cart(
        &self,
        book_id: BookId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartBackend for ApiClient {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.get_cart().await
    }

    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        Self::update_item_quantity(self, item_id, quantity).await
    }

    async fn remove_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        Self::remove_item(self, item_id).await
    }

    async fn add_to_cart(&self, book_id: BookId, quantity: u32) -> Result<(), ApiError> {
        Self::add_to_cart(self, book_id, quantity).await
    }
}

impl CartMirror {
    /// Load or reload the cart from the server.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the mirror is left untouched on failure.
    pub async fn refresh<B: CartBackend + Sync>(&mut self, backend: &B) -> Result<(), ApiError> {
        let cart = backend.fetch_cart().await?;
        self.replace(cart);
        Ok(())
    }

    /// Commit a line's edited quantity: one server write, then a full
    /// refetch on success. Convenience over the two-phase API for callers
    /// that drive one commit at a time.
    ///
    /// # Errors
    ///
    /// Returns the write or refetch error after recording it against the
    /// line; the optimistic quantity is kept either way.
    pub async fn commit<B: CartBackend + Sync>(
        &mut self,
        backend: &B,
        item_id: CartItemId,
    ) -> Result<(), ApiError> {
        let Some(ticket) = self.begin_commit(item_id) else {
            return Ok(());
        };
        let outcome = match backend
            .update_item_quantity(ticket.item_id, ticket.quantity)
            .await
        {
            Ok(_) => backend.fetch_cart().await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(cart) => {
                self.complete_commit(ticket, Ok(cart));
                Ok(())
            }
            Err(err) => {
                if ticket.epoch == self.epoch {
                    self.fail_commit(ticket.item_id, &err);
                }
                Err(err)
            }
        }
    }

    /// Remove a line: one server delete, then a full refetch on success.
    ///
    /// # Errors
    ///
    /// Returns the delete or refetch error after recording it against the
    /// line.
    pub async fn remove<B: CartBackend + Sync>(
        &mut self,
        backend: &B,
        item_id: CartItemId,
    ) -> Result<(), ApiError> {
        let epoch = self.epoch;
        let outcome = match backend.remove_item(item_id).await {
            Ok(()) => backend.fetch_cart().await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(cart) => {
                self.complete_remove(item_id, epoch, Ok(cart));
                Ok(())
            }
            Err(err) => {
                if epoch == self.epoch {
                    self.errors.insert(item_id, err.to_string());
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use bookbond_core::CartId;
    use chrono::Utc;

    use super::*;

    fn item(id: i64, book_id: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            cart_id: CartId::new(1),
            book_id: BookId::new(book_id),
            title: format!("Book {book_id}"),
            author: "Author".to_string(),
            price: bookbond_core::Price::from_cents(1000),
            cover_image_url: String::new(),
            stock: 5,
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            cart_id: CartId::new(1),
            items,
        }
    }

    fn quantity_of(mirror: &CartMirror, id: i64) -> u32 {
        mirror
            .cart()
            .unwrap()
            .item(CartItemId::new(id))
            .unwrap()
            .quantity
    }

    #[test]
    fn test_edit_patches_local_copy_immediately() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(1), 5);

        assert_eq!(quantity_of(&mirror, 1), 5);
        assert_eq!(mirror.item_state(CartItemId::new(1)), ItemEditState::Editing);
    }

    #[test]
    fn test_edit_unknown_line_is_noop() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(99), 5);

        assert_eq!(mirror.item_state(CartItemId::new(99)), ItemEditState::Viewing);
    }

    #[test]
    fn test_last_write_wins_by_arrival_order() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(1), 7);
        mirror.edit_quantity(CartItemId::new(1), 3);

        assert_eq!(quantity_of(&mirror, 1), 3);
    }

    #[test]
    fn test_successful_commit_replaces_mirror_wholesale() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2), item(2, 20, 1)]));

        mirror.edit_quantity(CartItemId::new(1), 4);
        let ticket = mirror.begin_commit(CartItemId::new(1)).unwrap();
        assert_eq!(ticket.quantity(), 4);
        assert_eq!(
            mirror.item_state(CartItemId::new(1)),
            ItemEditState::Committing
        );

        // Server refetch knows something the write response didn't: line 2
        // changed too.
        let refetched = cart(vec![item(1, 10, 4), item(2, 20, 6)]);
        mirror.complete_commit(ticket, Ok(refetched));

        assert_eq!(quantity_of(&mirror, 1), 4);
        assert_eq!(quantity_of(&mirror, 2), 6);
        assert_eq!(mirror.item_state(CartItemId::new(1)), ItemEditState::Viewing);
    }

    #[test]
    fn test_failed_commit_keeps_optimistic_value_and_records_error() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(1), 9);
        let ticket = mirror.begin_commit(CartItemId::new(1)).unwrap();
        mirror.complete_commit(
            ticket,
            Err(ApiError::Server {
                status: 500,
                message: "write failed".to_string(),
            }),
        );

        // Divergence from the server is visible, not silently reverted
        assert_eq!(quantity_of(&mirror, 1), 9);
        assert_eq!(mirror.item_state(CartItemId::new(1)), ItemEditState::Viewing);
        assert!(mirror.item_error(CartItemId::new(1)).is_some());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(1), 8);
        let ticket = mirror.begin_commit(CartItemId::new(1)).unwrap();

        // A refresh lands while the write is in flight
        mirror.replace(cart(vec![item(1, 10, 3)]));

        mirror.complete_commit(ticket, Ok(cart(vec![item(1, 10, 8)])));

        // The stale outcome must not clobber the newer view
        assert_eq!(quantity_of(&mirror, 1), 3);
    }

    #[test]
    fn test_begin_commit_refuses_second_in_flight_write() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(1), 4);
        let first = mirror.begin_commit(CartItemId::new(1));
        let second = mirror.begin_commit(CartItemId::new(1));

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn test_new_edit_clears_previous_error() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        mirror.edit_quantity(CartItemId::new(1), 9);
        let ticket = mirror.begin_commit(CartItemId::new(1)).unwrap();
        mirror.complete_commit(
            ticket,
            Err(ApiError::Validation("quantity out of range".to_string())),
        );
        assert!(mirror.item_error(CartItemId::new(1)).is_some());

        mirror.edit_quantity(CartItemId::new(1), 5);
        assert!(mirror.item_error(CartItemId::new(1)).is_none());
    }

    #[test]
    fn test_successful_remove_replaces_mirror() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2), item(2, 20, 1)]));

        let epoch = mirror.current_epoch();
        mirror.complete_remove(CartItemId::new(1), epoch, Ok(cart(vec![item(2, 20, 1)])));

        let cart = mirror.cart().unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].id, CartItemId::new(2));
    }

    #[test]
    fn test_failed_remove_keeps_line_and_records_error() {
        let mut mirror = CartMirror::new();
        mirror.replace(cart(vec![item(1, 10, 2)]));

        let epoch = mirror.current_epoch();
        mirror.complete_remove(
            CartItemId::new(1),
            epoch,
            Err(ApiError::Server {
                status: 500,
                message: "delete failed".to_string(),
            }),
        );

        assert_eq!(mirror.cart().unwrap().items.len(), 1);
        assert!(mirror.item_error(CartItemId::new(1)).is_some());
    }

    /// Scripted backend for driving the async convenience methods.
    struct FakeBackend {
        cart: Mutex<Cart>,
        fail_update: bool,
    }

    impl FakeBackend {
        fn new(initial: Cart) -> Self {
            Self {
                cart: Mutex::new(initial),
                fail_update: false,
            }
        }
    }

    impl CartBackend for FakeBackend {
        async fn fetch_cart(&self) -> Result<Cart, ApiError> {
            Ok(self.cart.lock().unwrap().clone())
        }

        async fn update_item_quantity(
            &self,
            item_id: CartItemId,
            quantity: u32,
        ) -> Result<CartItem, ApiError> {
            if self.fail_update {
                return Err(ApiError::Server {
                    status: 500,
                    message: "update rejected".to_string(),
                });
            }
            let mut cart = self.cart.lock().unwrap();
            let line = cart
                .items
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or_else(|| ApiError::NotFound("cart item".to_string()))?;
            line.quantity = quantity;
            Ok(line.clone())
        }

        async fn remove_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
            self.cart.lock().unwrap().items.retain(|i| i.id != item_id);
            Ok(())
        }

        async fn add_to_cart(&self, _book_id: BookId, _quantity: u32) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_commit_drives_write_then_refetch() {
        let backend = FakeBackend::new(cart(vec![item(1, 10, 2)]));
        let mut mirror = CartMirror::new();
        mirror.refresh(&backend).await.unwrap();

        mirror.edit_quantity(CartItemId::new(1), 6);
        mirror.commit(&backend, CartItemId::new(1)).await.unwrap();

        assert_eq!(quantity_of(&mirror, 1), 6);
        assert_eq!(mirror.item_state(CartItemId::new(1)), ItemEditState::Viewing);
    }

    #[tokio::test]
    async fn test_commit_failure_surfaces_and_keeps_local_value() {
        let mut backend = FakeBackend::new(cart(vec![item(1, 10, 2)]));
        backend.fail_update = true;
        let mut mirror = CartMirror::new();
        mirror.refresh(&backend).await.unwrap();

        mirror.edit_quantity(CartItemId::new(1), 6);
        let result = mirror.commit(&backend, CartItemId::new(1)).await;

        assert!(result.is_err());
        assert_eq!(quantity_of(&mirror, 1), 6);
        assert!(mirror.item_error(CartItemId::new(1)).is_some());
    }

    #[tokio::test]
    async fn test_remove_drives_delete_then_refetch() {
        let backend = FakeBackend::new(cart(vec![item(1, 10, 2), item(2, 20, 1)]));
        let mut mirror = CartMirror::new();
        mirror.refresh(&backend).await.unwrap();

        mirror.remove(&backend, CartItemId::new(1)).await.unwrap();

        assert_eq!(mirror.cart().unwrap().items.len(), 1);
    }
}
