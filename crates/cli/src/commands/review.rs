//! Review commands.
//!
//! # Usage
//!
//! ```bash
//! bookbond review add 42 --rating 5 --content "Excellent."
//! ```

use bookbond_core::{BookId, Rating};

use super::client;

/// Submit a review and echo it back as stored by the server.
pub async fn add(
    book_id: i64,
    rating: u8,
    content: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let rating = Rating::new(rating)?;
    let api = client()?;

    let review = api.submit_review(BookId::new(book_id), content, rating).await?;

    println!("Review saved: [{}] {}", review.rating, review.content);
    Ok(())
}
