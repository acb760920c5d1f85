//! Catalog and review operations.

use bookbond_core::{BookId, Rating};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::types::{Book, BookSearch, NewReview, Review};

use super::cache::CacheValue;
use super::ApiClient;

impl ApiClient {
    /// Get a book by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the book does not exist or the request fails.
    #[instrument(skip(self), fields(book_id = %id))]
    pub async fn get_book(&self, id: BookId) -> Result<Book, ApiError> {
        let cache_key = format!("book:{id}");

        if let Some(CacheValue::Book(book)) = self.cache_get(&cache_key).await {
            debug!("cache hit for book");
            return Ok(*book);
        }

        let book: Book = self.execute(self.get(&format!("/books/{id}"))).await?;

        self.cache_insert(cache_key, CacheValue::Book(Box::new(book.clone())))
            .await;

        Ok(book)
    }

    /// Search the catalog.
    ///
    /// Search results are not cached; every distinct filter combination
    /// goes to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, search))]
    pub async fn search_books(&self, search: &BookSearch) -> Result<Vec<Book>, ApiError> {
        let request = self.get("/books/search").query(&search.to_query_pairs());
        self.execute(request).await
    }

    /// Get all books carrying the given tag.
    ///
    /// This is the related-books fetch; results are cached per tag so the
    /// detail view can be revisited without refetching.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(tag = %tag))]
    pub async fn books_by_tag(&self, tag: &str) -> Result<Vec<Book>, ApiError> {
        let cache_key = format!("tag:{tag}");

        if let Some(CacheValue::Books(books)) = self.cache_get(&cache_key).await {
            debug!("cache hit for tag search");
            return Ok(books);
        }

        let search = BookSearch::by_tag(tag);
        let books: Vec<Book> = self
            .execute(self.get("/books/search").query(&search.to_query_pairs()))
            .await?;

        self.cache_insert(cache_key, CacheValue::Books(books.clone()))
            .await;

        Ok(books)
    }

    /// Get all reviews of a book.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(book_id = %book_id))]
    pub async fn reviews_for_book(&self, book_id: BookId) -> Result<Vec<Review>, ApiError> {
        let cache_key = format!("reviews:{book_id}");

        if let Some(CacheValue::Reviews(reviews)) = self.cache_get(&cache_key).await {
            debug!("cache hit for reviews");
            return Ok(reviews);
        }

        let reviews: Vec<Review> = self
            .execute(self.get(&format!("/books/{book_id}/reviews")))
            .await?;

        self.cache_insert(cache_key, CacheValue::Reviews(reviews.clone()))
            .await;

        Ok(reviews)
    }

    /// Submit a review for a book.
    ///
    /// Empty content is rejected locally before any request is sent; an
    /// out-of-range rating cannot be constructed in the first place (see
    /// [`Rating`]). On success the book's cached reviews are invalidated so
    /// the next read reflects the submission.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for blank content, or a network /
    /// server error from the request.
    #[instrument(skip(self, content), fields(book_id = %book_id, rating = %rating))]
    pub async fn submit_review(
        &self,
        book_id: BookId,
        content: &str,
        rating: Rating,
    ) -> Result<Review, ApiError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::Validation(
                "review content cannot be empty".to_string(),
            ));
        }

        let payload = NewReview {
            content: content.to_string(),
            rating,
        };

        let review: Review = self
            .execute(
                self.post(&format!("/books/{book_id}/reviews"))
                    .json(&payload),
            )
            .await?;

        self.cache_invalidate(&format!("reviews:{book_id}")).await;

        Ok(review)
    }
}
