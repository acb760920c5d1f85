//! Shopping cart commands.
//!
//! # Usage
//!
//! ```bash
//! bookbond cart show
//! bookbond cart add 42 --quantity 2
//! bookbond cart update 7 --quantity 3
//! bookbond cart remove 7
//! ```
//!
//! Mutations go through the [`CartMirror`] so the printed cart always
//! reflects the server's post-mutation refetch, and a failed write keeps
//! the attempted value visible alongside its error.

use bookbond_client::mirror::CartMirror;
use bookbond_core::{BookId, CartItemId};

use super::client;

/// Print the current cart.
pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let mut mirror = CartMirror::new();
    mirror.refresh(&api).await?;

    print_mirror(&mirror);
    Ok(())
}

/// Add a book to the cart and print the updated cart.
pub async fn add(book_id: i64, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    api.add_to_cart(BookId::new(book_id), quantity).await?;

    let mut mirror = CartMirror::new();
    mirror.refresh(&api).await?;

    println!("Added book {book_id} (x{quantity}).");
    print_mirror(&mirror);
    Ok(())
}

/// Change a line's quantity and print the updated cart.
pub async fn update(item_id: i64, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let item_id = CartItemId::new(item_id);

    let mut mirror = CartMirror::new();
    mirror.refresh(&api).await?;

    mirror.edit_quantity(item_id, quantity);
    if let Err(err) = mirror.commit(&api, item_id).await {
        // The mirror keeps the attempted quantity; show both.
        print_mirror(&mirror);
        return Err(err.into());
    }

    print_mirror(&mirror);
    Ok(())
}

/// Remove a line and print the updated cart.
pub async fn remove(item_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let item_id = CartItemId::new(item_id);

    let mut mirror = CartMirror::new();
    mirror.refresh(&api).await?;
    mirror.remove(&api, item_id).await?;

    println!("Removed item {item_id}.");
    print_mirror(&mirror);
    Ok(())
}

fn print_mirror(mirror: &CartMirror) {
    let Some(cart) = mirror.cart() else {
        println!("Cart is empty.");
        return;
    };
    if cart.items.is_empty() {
        println!("Cart is empty.");
        return;
    }

    for item in &cart.items {
        let line_total = item.price.times(item.quantity);
        print!(
            "#{:<6} {} x{}  {}",
            item.id,
            item.title,
            item.quantity,
            line_total.display()
        );
        match mirror.item_error(item.id) {
            Some(err) => println!("  (not saved: {err})"),
            None => println!(),
        }
    }
    println!("Subtotal: {}", cart.subtotal().display());
}
