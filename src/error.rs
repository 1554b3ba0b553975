// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing notices.

/// Identity provider error codes that get special treatment.
pub mod auth_codes {
    pub const INVALID_LOGIN_CREDENTIALS: &str = "auth/invalid-login-credentials";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
    pub const CANCELLED_POPUP_REQUEST: &str = "auth/cancelled-popup-request";
    pub const OPERATION_NOT_SUPPORTED: &str = "auth/operation-not-supported";
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Identity provider error ({code}): {message}")]
    Identity { code: String, message: String },

    #[error("Player error: {0}")]
    Player(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// How an error should be surfaced to the person using the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Nothing to show; the failure was expected or already degraded.
    Silent,
    /// A blocking message.
    Blocking(String),
}

impl AppError {
    /// Build an identity error from a provider code and message.
    pub fn identity(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Identity {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The identity provider error code, if this is an identity error.
    pub fn identity_code(&self) -> Option<&str> {
        match self {
            AppError::Identity { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Map this error to what the user should see after a login attempt.
    pub fn login_notice(&self) -> Notice {
        use auth_codes::*;
        match self {
            AppError::Identity { code, .. }
                if code == INVALID_LOGIN_CREDENTIALS
                    || code == INVALID_CREDENTIAL
                    || code == WRONG_PASSWORD =>
            {
                Notice::Blocking(
                    "Login failed. \n\n\
                     1. If you signed up with Google, please use the 'Continue with Google' button.\n\
                     2. Check your email/User ID and password for typos.\n\
                     3. If you don't have an account, please Sign Up."
                        .to_string(),
                )
            }
            AppError::Identity { code, .. } if code == USER_NOT_FOUND => {
                Notice::Blocking("No account found with this email. Please sign up.".to_string())
            }
            AppError::NotFound(_) => Notice::Blocking(
                "User ID not found. Please check the ID or login with your email.".to_string(),
            ),
            other => Notice::Blocking(format!("Login failed: {}", other.user_message())),
        }
    }

    /// Map this error to what the user should see after a popup sign-in.
    pub fn popup_notice(&self) -> Notice {
        use auth_codes::*;
        match self.identity_code() {
            Some(code) if code == POPUP_CLOSED_BY_USER || code == CANCELLED_POPUP_REQUEST => {
                Notice::Silent
            }
            _ => Notice::Blocking(format!("Google Sign-In failed: {}", self.user_message())),
        }
    }

    /// Map this error to what the user should see after a signup attempt.
    pub fn signup_notice(&self) -> Notice {
        match self.identity_code() {
            Some(auth_codes::EMAIL_ALREADY_IN_USE) => Notice::Blocking(
                "This email is already registered. Please login instead.".to_string(),
            ),
            _ => Notice::Blocking(format!("Signup failed: {}", self.user_message())),
        }
    }

    /// Short message without the error category prefix.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Identity { message, .. } => message.clone(),
            AppError::Http { detail, .. } => detail.clone(),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_closed_is_silent() {
        let err = AppError::identity(auth_codes::POPUP_CLOSED_BY_USER, "closed");
        assert_eq!(err.popup_notice(), Notice::Silent);

        let err = AppError::identity("auth/network-request-failed", "offline");
        assert_eq!(
            err.popup_notice(),
            Notice::Blocking("Google Sign-In failed: offline".to_string())
        );
    }

    #[test]
    fn http_detail_is_user_message() {
        let err = AppError::Http {
            status: 409,
            detail: "Username already taken".to_string(),
        };
        assert_eq!(err.user_message(), "Username already taken");
        assert_eq!(
            err.signup_notice(),
            Notice::Blocking("Signup failed: Username already taken".to_string())
        );
    }
}
