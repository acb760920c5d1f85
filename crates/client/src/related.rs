//! Related-books aggregation for the book detail view.
//!
//! Given the primary book's tags, one search is issued per tag against a
//! [`TagSearch`] collaborator. The fetches run concurrently and settle
//! independently, but the merge uses the tag-array order, not completion
//! order, so the output is deterministic despite nondeterministic network
//! timing.
//!
//! The group is fail-closed: one failed tag search fails the whole
//! aggregation and partial successes are discarded. Duplicate tags in the
//! input are fetched redundantly (no request-level dedup); the result-level
//! dedup still applies.

use std::collections::HashSet;

use bookbond_core::BookId;
use futures::future::join_all;
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::Book;

/// Collaborator that looks up books by tag.
///
/// [`ApiClient`] is the production implementation; tests script their own.
pub trait TagSearch {
    /// All books carrying the given tag.
    fn books_by_tag(
        &self,
        tag: &str,
    ) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send;
}

impl TagSearch for ApiClient {
    async fn books_by_tag(&self, tag: &str) -> Result<Vec<Book>, ApiError> {
        Self::books_by_tag(self, tag).await
    }
}

/// Aggregate related books for the given primary book.
///
/// Resolves only once every per-tag fetch has settled. On success the
/// per-tag result lists are concatenated in tag order and deduplicated by
/// book id (first occurrence wins); the primary book itself is always
/// excluded. Zero tags short-circuits to an empty result with no fetch
/// attempted.
///
/// # Errors
///
/// Returns the first failure in tag order if any per-tag fetch failed;
/// results from the tags that succeeded are discarded.
#[instrument(skip(search, book), fields(book_id = %book.id, tags = book.tags.len()))]
pub async fn related_books<S: TagSearch + Sync>(
    search: &S,
    book: &Book,
) -> Result<Vec<Book>, ApiError> {
    if book.tags.is_empty() {
        return Ok(Vec::new());
    }

    let fetches = book.tags.iter().map(|tag| search.books_by_tag(tag));
    let settled = join_all(fetches).await;

    let mut related = Vec::new();
    let mut seen: HashSet<BookId> = HashSet::new();

    for result in settled {
        for candidate in result? {
            if candidate.id == book.id {
                continue;
            }
            if seen.insert(candidate.id) {
                related.push(candidate);
            }
        }
    }

    Ok(related)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    fn book(id: i64, tags: &[&str]) -> Book {
        Book {
            id: BookId::new(id),
            title: format!("Book {id}"),
            author: "Author".to_string(),
            isbn: "9780000000000".to_string(),
            price: bookbond_core::Price::from_cents(999),
            tags: tags.iter().map(ToString::to_string).collect(),
            description: String::new(),
            cover_image_url: String::new(),
            pages: 100,
            stock: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 1,
        }
    }

    /// Scripted collaborator: canned results per tag, call counting.
    struct FakeSearch {
        results: HashMap<String, Result<Vec<Book>, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSearch {
        fn new(results: HashMap<String, Result<Vec<Book>, String>>) -> Self {
            Self {
                results,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TagSearch for FakeSearch {
        async fn books_by_tag(&self, tag: &str) -> Result<Vec<Book>, ApiError> {
            self.calls.lock().unwrap().push(tag.to_string());
            match self.results.get(tag) {
                Some(Ok(books)) => Ok(books.clone()),
                Some(Err(message)) => Err(ApiError::Server {
                    status: 500,
                    message: message.clone(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    #[tokio::test]
    async fn test_merges_in_tag_order_excluding_primary() {
        // fetch(a) -> [1, 2], fetch(b) -> [2, 3], primary id 2
        // Expected output: exactly [1, 3], in that order.
        let search = FakeSearch::new(HashMap::from([
            ("a".to_string(), Ok(vec![book(1, &[]), book(2, &[])])),
            ("b".to_string(), Ok(vec![book(2, &[]), book(3, &[])])),
        ]));
        let primary = book(2, &["a", "b"]);

        let related = related_books(&search, &primary).await.unwrap();

        let ids: Vec<i64> = related.iter().map(|b| b.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_zero_tags_yields_empty_without_fetching() {
        let search = FakeSearch::new(HashMap::new());
        let primary = book(2, &[]);

        let related = related_books(&search, &primary).await.unwrap();

        assert!(related.is_empty());
        assert!(search.calls().is_empty());
    }

    #[tokio::test]
    async fn test_first_occurrence_wins_across_tags() {
        // Book 5 appears under both tags; only the first hit survives.
        let search = FakeSearch::new(HashMap::from([
            ("x".to_string(), Ok(vec![book(5, &[]), book(6, &[])])),
            ("y".to_string(), Ok(vec![book(5, &[]), book(7, &[])])),
        ]));
        let primary = book(1, &["x", "y"]);

        let related = related_books(&search, &primary).await.unwrap();

        let ids: Vec<i64> = related.iter().map(|b| b.id.as_i64()).collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[tokio::test]
    async fn test_fail_closed_discards_partial_successes() {
        let search = FakeSearch::new(HashMap::from([
            ("ok".to_string(), Ok(vec![book(9, &[])])),
            ("broken".to_string(), Err("tag index offline".to_string())),
        ]));
        let primary = book(1, &["ok", "broken"]);

        let result = related_books(&search, &primary).await;

        assert!(matches!(result, Err(ApiError::Server { status: 500, .. })));
        // Both fetches were still issued
        assert_eq!(search.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_tags_fetch_redundantly() {
        let search = FakeSearch::new(HashMap::from([(
            "dup".to_string(),
            Ok(vec![book(3, &[])]),
        )]));
        let primary = book(1, &["dup", "dup"]);

        let related = related_books(&search, &primary).await.unwrap();

        // Redundant fetches are permitted at the request layer
        assert_eq!(search.calls(), vec!["dup", "dup"]);
        // Result-level dedup still applies
        let ids: Vec<i64> = related.iter().map(|b| b.id.as_i64()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_tag_returning_only_primary_yields_empty() {
        let search = FakeSearch::new(HashMap::from([(
            "self".to_string(),
            Ok(vec![book(2, &[])]),
        )]));
        let primary = book(2, &["self"]);

        let related = related_books(&search, &primary).await.unwrap();
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_stable_across_repeated_runs() {
        let search = FakeSearch::new(HashMap::from([
            ("a".to_string(), Ok(vec![book(4, &[]), book(5, &[])])),
            ("b".to_string(), Ok(vec![book(6, &[])])),
        ]));
        let primary = book(1, &["a", "b"]);

        let first = related_books(&search, &primary).await.unwrap();
        let second = related_books(&search, &primary).await.unwrap();

        let ids = |books: &[Book]| books.iter().map(|b| b.id.as_i64()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }
}
