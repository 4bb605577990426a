//! Authenticated session.
//!
//! The session is a plain value owned by
//! [`SafeRideCore`](crate::SafeRideCore) and passed explicitly to anything
//! that needs it. There is no global current user.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafeRideError};
use crate::feed::User;

/// Response body of `/api/login` and `/api/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// JWT access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// The authenticated user.
    pub user: User,
}

/// A logged-in user and their access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    /// Creates a session.
    #[must_use]
    pub const fn new(token: String, user: User) -> Self {
        Self { token, user }
    }

    /// The logged-in user.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// The raw access token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value of the `Authorization` header.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use saferide_core::feed::User;
    /// use saferide_core::session::Session;
    ///
    /// let user = User {
    ///     id: "u1".into(),
    ///     email: "ana@example.com".into(),
    ///     name: "Ana".into(),
    ///     vehicle_plate: "ABC1D23".into(),
    ///     created_at: Utc::now(),
    /// };
    /// let session = Session::new("t0k3n".into(), user);
    /// assert_eq!(session.bearer(), "Bearer t0k3n");
    /// ```
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl From<TokenResponse> for Session {
    fn from(response: TokenResponse) -> Self {
        Self::new(response.access_token, response.user)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Body for `POST /api/forgot-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetRequest {
    /// Address the reset link is sent to, trimmed and lowercased.
    pub email: String,
}

impl PasswordResetRequest {
    /// Builds a reset request for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::InvalidEmail`] unless the address looks like
    /// `local@domain.tld`.
    pub fn new(email: &str) -> Result<Self> {
        let email = email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(SafeRideError::InvalidEmail(email));
        }
        Ok(Self { email })
    }
}

/// Body for `POST /api/reset-password`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PasswordReset {
    /// Token from the reset link.
    pub token: String,
    /// Replacement password.
    pub new_password: String,
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset")
            .field("token", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
