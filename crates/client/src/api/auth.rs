//! Authentication and account operations.
//!
//! Sign-in stores the issued bearer token in the shared session (and
//! persists it); sign-out clears it. Everything else is a straight call
//! through to the server.

use bookbond_core::Email;
use secrecy::SecretString;
use tracing::instrument;

use crate::error::ApiError;
use crate::types::{Credentials, PasswordReset, RegisteredUser, SignUp, User};

use super::ApiClient;

impl ApiClient {
    /// Register a new account.
    ///
    /// The account starts inactive; the returned activation token (also
    /// emailed to the user) must be redeemed via
    /// [`activate`](Self::activate).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank username or password,
    /// or a network / server error from the request.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        username: &str,
        email: Email,
        password: &str,
    ) -> Result<RegisteredUser, ApiError> {
        if username.trim().is_empty() {
            return Err(ApiError::Validation("username cannot be empty".to_string()));
        }
        if password.is_empty() {
            return Err(ApiError::Validation("password cannot be empty".to_string()));
        }

        let payload = SignUp {
            username: username.trim().to_string(),
            email,
            password: password.to_string(),
        };

        self.execute(self.post("/authentication/user").json(&payload))
            .await
    }

    /// Exchange credentials for a bearer token and open a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request
    /// fails; the session is left untouched on failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: Email, password: &str) -> Result<(), ApiError> {
        let payload = Credentials {
            email,
            password: password.to_string(),
        };

        let token: String = self
            .execute(self.post("/authentication/token").json(&payload))
            .await?;

        self.with_session(|session| session.issue(SecretString::from(token)));
        tracing::info!("session established");
        Ok(())
    }

    /// Drop the session credential and its persisted copy.
    pub fn sign_out(&self) {
        self.with_session(crate::session::Session::clear);
        tracing::info!("session cleared");
    }

    /// Redeem an account activation token.
    ///
    /// Returns the newly activated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown or spent token, or a
    /// network / server error from the request.
    #[instrument(skip(self, token))]
    pub async fn activate(&self, token: &str) -> Result<User, ApiError> {
        self.execute(self.put(&format!("/authentication/activate/{token}")))
            .await
    }

    /// Request a password reset token for the given email.
    ///
    /// The server emails the token; it is also returned here so
    /// non-interactive callers can complete the flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn password_reset_request(&self, email: Email) -> Result<String, ApiError> {
        self.execute(
            self.post("/password/reset-request")
                .json(&serde_json::json!({ "email": email })),
        )
        .await
    }

    /// Check whether a password reset token is still valid and unused.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown token, a server error
    /// for a spent or expired one, or a network error from the request.
    #[instrument(skip(self, token))]
    pub async fn password_request_verify(&self, token: &str) -> Result<(), ApiError> {
        self.execute_raw(
            self.get("/password/request/verify")
                .query(&[("token", token)]),
        )
        .await?;
        Ok(())
    }

    /// Complete a password reset.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank password, or a network /
    /// server error from the request.
    #[instrument(skip(self, token, new_password))]
    pub async fn password_reset(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        if new_password.is_empty() {
            return Err(ApiError::Validation("password cannot be empty".to_string()));
        }

        let payload = PasswordReset {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };

        self.execute_raw(self.post("/password/reset").json(&payload))
            .await?;
        Ok(())
    }

    /// Fetch the currently authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a valid session, or a
    /// network / server error from the request.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.execute(self.get("/users/me")).await
    }
}
