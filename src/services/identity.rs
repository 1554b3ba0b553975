// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider boundary.
//!
//! The hosted identity provider owns sign-up, sign-in, verification, and
//! token issuance. This client only needs a handful of operations from it,
//! captured by [`IdentityProvider`].

use crate::error::{auth_codes, AppError};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;

/// Sign-in method a user account was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInMethod {
    Password,
    Google,
    Other(String),
}

impl SignInMethod {
    pub fn from_provider_id(id: &str) -> Self {
        match id {
            "password" => SignInMethod::Password,
            "google.com" => SignInMethod::Google,
            other => SignInMethod::Other(other.to_string()),
        }
    }
}

/// The currently signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub method: SignInMethod,
}

impl IdentityUser {
    /// Password accounts must verify their email before using the app.
    pub fn needs_email_verification(&self) -> bool {
        !self.email_verified && self.method == SignInMethod::Password
    }

    /// Name used for generated avatars.
    pub fn avatar_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Operations the client consumes from the hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if a session exists.
    async fn current_user(&self) -> Option<IdentityUser>;

    /// A bearer token for the current session.
    async fn id_token(&self, force_refresh: bool) -> Result<String, AppError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError>;

    /// Interactive third-party sign-in (Google popup).
    async fn sign_in_with_popup(&self) -> Result<IdentityUser, AppError>;

    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityUser, AppError>;

    async fn update_display_name(&self, name: &str) -> Result<(), AppError>;

    async fn send_email_verification(&self) -> Result<(), AppError>;

    /// Delete the signed-in account (used to roll back a failed signup).
    async fn delete_current_user(&self) -> Result<(), AppError>;

    async fn sign_out(&self) -> Result<(), AppError>;
}

/// ID token claims the client reads. Signatures are checked by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub firebase: Option<ProviderClaims>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderClaims {
    #[serde(default)]
    pub sign_in_provider: Option<String>,
}

/// Read the claims of an ID token without verifying its signature.
pub fn peek_claims(token: &str) -> Result<IdTokenClaims, AppError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<IdTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Decode(format!("invalid ID token: {e}")))
}

/// Identity backed by a pre-issued ID token (headless hosts, tests).
///
/// A session exists while the token decodes and has not expired.
/// Interactive flows are not available.
pub struct StaticTokenIdentity {
    token: Option<String>,
}

impl StaticTokenIdentity {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    fn live_claims(&self) -> Option<IdTokenClaims> {
        let token = self.token.as_deref()?;
        let claims = match peek_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "Configured ID token is unusable");
                return None;
            }
        };

        let now = chrono::Utc::now().timestamp();
        match claims.exp {
            Some(exp) if exp <= now => {
                tracing::info!(exp, "Configured ID token has expired");
                None
            }
            _ => Some(claims),
        }
    }

    fn unsupported(operation: &str) -> AppError {
        AppError::identity(
            auth_codes::OPERATION_NOT_SUPPORTED,
            format!("{operation} is not available with a static token"),
        )
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn current_user(&self) -> Option<IdentityUser> {
        let claims = self.live_claims()?;
        let method = claims
            .firebase
            .and_then(|f| f.sign_in_provider)
            .map(|p| SignInMethod::from_provider_id(&p))
            .unwrap_or(SignInMethod::Password);

        Some(IdentityUser {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified.unwrap_or(false),
            display_name: claims.name,
            photo_url: claims.picture,
            method,
        })
    }

    async fn id_token(&self, _force_refresh: bool) -> Result<String, AppError> {
        self.live_claims().ok_or(AppError::Unauthorized)?;
        self.token.clone().ok_or(AppError::Unauthorized)
    }

    async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<IdentityUser, AppError> {
        Err(Self::unsupported("Password sign-in"))
    }

    async fn sign_in_with_popup(&self) -> Result<IdentityUser, AppError> {
        Err(Self::unsupported("Popup sign-in"))
    }

    async fn create_user(&self, _: &str, _: &str) -> Result<IdentityUser, AppError> {
        Err(Self::unsupported("Account creation"))
    }

    async fn update_display_name(&self, _: &str) -> Result<(), AppError> {
        Err(Self::unsupported("Profile update"))
    }

    async fn send_email_verification(&self) -> Result<(), AppError> {
        Err(Self::unsupported("Email verification"))
    }

    async fn delete_current_user(&self) -> Result<(), AppError> {
        Err(Self::unsupported("Account deletion"))
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        Ok(())
    }
}
