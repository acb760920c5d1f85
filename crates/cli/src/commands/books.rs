//! Catalog commands: search and book detail.
//!
//! # Usage
//!
//! ```bash
//! bookbond books search --query rust --tag systems --max-price 50
//! bookbond books show 42
//! ```
//!
//! The detail view loads reviews and related titles alongside the book
//! itself; a failure in one region is reported in place without hiding
//! the regions that did load.

use bookbond_client::api::ApiClient;
use bookbond_client::related::related_books;
use bookbond_client::types::{Book, BookSearch, Review};
use bookbond_client::view::DataState;
use bookbond_core::{BookId, Price};
use rust_decimal::Decimal;

use super::client;

/// Assemble a search filter from command-line arguments.
pub fn build_search(
    query: Option<String>,
    title: Option<String>,
    author: Option<String>,
    tags: Vec<String>,
    min_price: Option<&str>,
    max_price: Option<&str>,
    in_stock: bool,
) -> Result<BookSearch, Box<dyn std::error::Error>> {
    Ok(BookSearch {
        query,
        title,
        author,
        tags,
        min_price: min_price.map(parse_price).transpose()?,
        max_price: max_price.map(parse_price).transpose()?,
        in_stock: in_stock.then_some(true),
    })
}

fn parse_price(s: &str) -> Result<Price, rust_decimal::Error> {
    s.parse::<Decimal>().map(Price::new)
}

/// Search the catalog and print matches.
pub async fn search(filter: &BookSearch) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let books = api.search_books(filter).await?;

    if books.is_empty() {
        println!("No books matched.");
        return Ok(());
    }

    for book in &books {
        print_book_line(book);
    }
    println!("{} book(s)", books.len());
    Ok(())
}

/// Show a book's detail page: the book, its reviews, and related titles.
///
/// The book itself must load; reviews and related titles are fetched
/// concurrently afterwards and each region fails independently.
pub async fn show(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let book_id = BookId::new(id);

    let book = api.get_book(book_id).await?;

    let (reviews, related) = tokio::join!(
        fetch_reviews(&api, book_id),
        fetch_related(&api, &book),
    );

    print_detail(&book);
    print_reviews(&reviews);
    print_related(&related);
    Ok(())
}

async fn fetch_reviews(api: &ApiClient, book_id: BookId) -> DataState<Vec<Review>> {
    api.reviews_for_book(book_id).await.into()
}

async fn fetch_related(api: &ApiClient, book: &Book) -> DataState<Vec<Book>> {
    related_books(api, book).await.into()
}

fn print_book_line(book: &Book) {
    println!(
        "#{:<6} {} — {} ({})",
        book.id,
        book.title,
        book.author,
        book.price.display()
    );
}

fn print_detail(book: &Book) {
    println!("{}", book.title);
    println!("by {}", book.author);
    println!("Price: {}", book.price.display());
    println!("ISBN: {}  Pages: {}", book.isbn, book.pages);
    if book.stock > 0 {
        println!("In stock: {}", book.stock);
    } else {
        println!("Out of stock");
    }
    if !book.tags.is_empty() {
        println!("Tags: {}", book.tags.join(", "));
    }
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }
}

fn print_reviews(reviews: &DataState<Vec<Review>>) {
    println!();
    match reviews {
        DataState::Loading => println!("Reviews: loading"),
        DataState::Failed(err) => println!("Reviews unavailable: {err}"),
        DataState::Ready(reviews) if reviews.is_empty() => {
            println!("No reviews yet.");
        }
        DataState::Ready(reviews) => {
            println!(
                "Reviews ({}, average {:.1}):",
                reviews.len(),
                average_rating(reviews)
            );
            for review in reviews {
                println!("  [{}] {}", review.rating, review.content);
            }
        }
    }
}

fn print_related(related: &DataState<Vec<Book>>) {
    println!();
    match related {
        DataState::Loading => println!("Related books: loading"),
        DataState::Failed(err) => println!("Related books unavailable: {err}"),
        DataState::Ready(books) if books.is_empty() => {
            println!("No related books.");
        }
        DataState::Ready(books) => {
            println!("Related books:");
            for book in books {
                print_book_line(book);
            }
        }
    }
}

fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating.stars())).sum();
    f64::from(total) / reviews.len() as f64
}
