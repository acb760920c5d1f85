//! Password reset commands.
//!
//! # Usage
//!
//! ```bash
//! bookbond password forgot -e amy@example.com
//! bookbond password verify <token>
//! bookbond password reset <token> -p new-secret
//! ```

use bookbond_core::Email;

use super::client;

/// Request a password reset email for the account.
pub async fn forgot(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let api = client()?;

    let message = api.password_reset_request(email).await?;
    println!("{message}");
    Ok(())
}

/// Check whether a reset token is still redeemable.
pub async fn verify(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    api.password_request_verify(token).await?;
    println!("Token is valid.");
    Ok(())
}

/// Redeem a reset token and set a new password.
pub async fn reset(token: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let api = client()?;
    api.password_reset(token, password).await?;
    println!("Password updated. Sign in with the new password.");
    Ok(())
}
