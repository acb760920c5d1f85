//! Live tests for sign-in, cart mutations, and review round-trips.
//!
//! These tests require a running BookBond API server, a seeded catalog,
//! and an activated test account. See the crate README for the required
//! environment. Cart tests clean up after themselves but assume the test
//! account's cart starts out expendable.

use bookbond_client::session::SessionState;
use bookbond_client::mirror::CartMirror;
use bookbond_client::types::BookSearch;
use bookbond_core::Rating;
use bookbond_integration_tests::{anonymous_client, signed_in_client};

#[tokio::test]
#[ignore = "Requires running API server and test account"]
async fn test_sign_in_opens_session() {
    let client = signed_in_client().await;
    assert_eq!(client.session_state(), SessionState::Authenticated);

    let user = client.current_user().await.expect("whoami failed");
    let email = std::env::var("BOOKBOND_TEST_EMAIL").expect("BOOKBOND_TEST_EMAIL not set");
    assert_eq!(user.email.as_str(), email);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_cart_requires_authentication() {
    let client = anonymous_client();

    let result = client.get_cart().await;
    assert!(result.expect_err("anonymous cart read should fail").is_unauthorized());
}

#[tokio::test]
#[ignore = "Requires running API server and test account"]
async fn test_cart_add_update_remove_round_trip() {
    let client = signed_in_client().await;

    let books = client
        .search_books(&BookSearch::default())
        .await
        .expect("search failed");
    let book = books
        .iter()
        .find(|b| b.stock > 0)
        .expect("seeded catalog should have an in-stock book");

    client
        .add_to_cart(book.id, 1)
        .await
        .expect("add to cart failed");

    let mut mirror = CartMirror::new();
    mirror.refresh(&client).await.expect("cart fetch failed");
    let item_id = mirror
        .cart()
        .expect("cart should be loaded")
        .items
        .iter()
        .find(|i| i.book_id == book.id)
        .expect("added book missing from cart")
        .id;

    mirror.edit_quantity(item_id, 3);
    mirror.commit(&client, item_id).await.expect("commit failed");
    let committed = mirror
        .cart()
        .expect("cart should be loaded")
        .item(item_id)
        .expect("item missing after commit");
    assert_eq!(committed.quantity, 3);

    mirror.remove(&client, item_id).await.expect("remove failed");
    assert!(
        mirror
            .cart()
            .expect("cart should be loaded")
            .item(item_id)
            .is_none()
    );
}

#[tokio::test]
#[ignore = "Requires running API server and test account"]
async fn test_submitted_review_appears_on_next_read() {
    let client = signed_in_client().await;

    let books = client
        .search_books(&BookSearch::default())
        .await
        .expect("search failed");
    let book = books.first().expect("seeded catalog should not be empty");

    let content = format!("Integration test review at {}", unique_suffix());
    let rating = Rating::new(4).expect("valid rating");

    let submitted = client
        .submit_review(book.id, &content, rating)
        .await
        .expect("review submission failed");
    assert_eq!(submitted.content, content);

    // Submission invalidates the cached review list, so the next read
    // must include the new review.
    let reviews = client
        .reviews_for_book(book.id)
        .await
        .expect("review fetch failed");
    assert!(reviews.iter().any(|r| r.id == submitted.id));
}

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos())
}
