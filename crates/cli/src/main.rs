//! BookBond CLI - command-line storefront for the BookBond API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bookbond books search --query rust --tag systems
//! bookbond books show 42
//!
//! # Account
//! bookbond auth sign-up -u amy -e amy@example.com -p secret
//! bookbond auth sign-in -e amy@example.com -p secret
//! bookbond auth whoami
//!
//! # Shop
//! bookbond cart add 42 --quantity 2
//! bookbond cart update 7 --quantity 3
//! bookbond cart show
//!
//! # Review
//! bookbond review add 42 --rating 5 --content "Excellent."
//! ```
//!
//! # Commands
//!
//! - `auth` - Sign-up, activation, sign-in/out, and identity
//! - `password` - Password reset flow
//! - `books` - Catalog search and book detail
//! - `cart` - Shopping cart
//! - `review` - Submit reviews

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bookbond")]
#[command(author, version, about = "BookBond storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account sign-up, activation, and sessions
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Password reset flow
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
    /// Catalog search and book detail
    Books {
        #[command(subcommand)]
        action: BooksAction,
    },
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Book reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Register a new account
    SignUp {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Redeem an activation token
    Activate {
        /// Activation token from the sign-up email
        token: String,
    },
    /// Sign in and persist the session
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Discard the persisted session
    SignOut,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Request a password reset email for a forgotten password
    Forgot {
        /// Email address of the account
        #[arg(short, long)]
        email: String,
    },
    /// Check whether a reset token is still valid
    Verify {
        /// Reset token from the email
        token: String,
    },
    /// Set a new password using a reset token
    Reset {
        /// Reset token from the email
        token: String,

        /// New password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum BooksAction {
    /// List the whole catalog
    List,
    /// Search the catalog
    Search {
        /// Free-text query matched against title, author, and description
        #[arg(short, long)]
        query: Option<String>,

        /// Match on title
        #[arg(long)]
        title: Option<String>,

        /// Match on author
        #[arg(long)]
        author: Option<String>,

        /// Match on tag (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Minimum price, e.g. 9.99
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum price, e.g. 29.99
        #[arg(long)]
        max_price: Option<String>,

        /// Only books currently in stock
        #[arg(long)]
        in_stock: bool,
    },
    /// Show a book's detail, reviews, and related titles
    Show {
        /// Book id
        id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a book to the cart
    Add {
        /// Book id
        book_id: i64,

        /// Quantity (1-10)
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a cart line's quantity
    Update {
        /// Cart item id
        item_id: i64,

        /// New quantity (1-10)
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart item id
        item_id: i64,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Submit a review for a book
    Add {
        /// Book id
        book_id: i64,

        /// Star rating (1-5)
        #[arg(short, long)]
        rating: u8,

        /// Review text
        #[arg(short, long)]
        content: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::SignUp {
                username,
                email,
                password,
            } => commands::auth::sign_up(&username, &email, &password).await?,
            AuthAction::Activate { token } => commands::auth::activate(&token).await?,
            AuthAction::SignIn { email, password } => {
                commands::auth::sign_in(&email, &password).await?;
            }
            AuthAction::SignOut => commands::auth::sign_out()?,
            AuthAction::Whoami => commands::auth::whoami().await?,
        },
        Commands::Password { action } => match action {
            PasswordAction::Forgot { email } => commands::password::forgot(&email).await?,
            PasswordAction::Verify { token } => commands::password::verify(&token).await?,
            PasswordAction::Reset { token, password } => {
                commands::password::reset(&token, &password).await?;
            }
        },
        Commands::Books { action } => match action {
            BooksAction::List => {
                commands::books::search(&bookbond_client::types::BookSearch::default()).await?;
            }
            BooksAction::Search {
                query,
                title,
                author,
                tag,
                min_price,
                max_price,
                in_stock,
            } => {
                let filter = commands::books::build_search(
                    query,
                    title,
                    author,
                    tag,
                    min_price.as_deref(),
                    max_price.as_deref(),
                    in_stock,
                )?;
                commands::books::search(&filter).await?;
            }
            BooksAction::Show { id } => commands::books::show(id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await?,
            CartAction::Add { book_id, quantity } => {
                commands::cart::add(book_id, quantity).await?;
            }
            CartAction::Update { item_id, quantity } => {
                commands::cart::update(item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(item_id).await?,
        },
        Commands::Review { action } => match action {
            ReviewAction::Add {
                book_id,
                rating,
                content,
            } => commands::review::add(book_id, rating, &content).await?,
        },
    }
    Ok(())
}
