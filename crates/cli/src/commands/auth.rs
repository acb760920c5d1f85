//! Account and session commands.
//!
//! # Usage
//!
//! ```bash
//! bookbond auth sign-up -u amy -e amy@example.com -p secret
//! bookbond auth activate <token>
//! bookbond auth sign-in -e amy@example.com -p secret
//! bookbond auth whoami
//! bookbond auth sign-out
//! ```

use bookbond_core::Email;

use super::client;

/// Register a new account and print its activation token.
pub async fn sign_up(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let api = client()?;

    let registered = api.sign_up(username, email, password).await?;

    println!("Account created for {}.", registered.user.username);
    println!("Activation token: {}", registered.token);
    println!("Activate with: bookbond auth activate {}", registered.token);
    Ok(())
}

/// Redeem an activation token.
pub async fn activate(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let user = api.activate(token).await?;
    println!("Account for {} activated. You can now sign in.", user.username);
    Ok(())
}

/// Sign in and persist the session token for later runs.
pub async fn sign_in(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let api = client()?;

    api.sign_in(email, password).await?;

    println!("Signed in.");
    Ok(())
}

/// Discard the persisted session.
pub fn sign_out() -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    api.sign_out();
    println!("Signed out.");
    Ok(())
}

/// Show who the persisted session belongs to.
pub async fn whoami() -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    let user = api.current_user().await?;

    println!("{} <{}>", user.username, user.email);
    if !user.is_active {
        println!("(account not yet activated)");
    }
    Ok(())
}
