// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted session record: profile, theme flag, pending verification email.

use crate::error::AppError;
use crate::models::{Theme, UserProfile};
use crate::store::{keys, LocalStore};

/// Typed access to the signed-in user's locally stored state.
#[derive(Clone)]
pub struct SessionStore {
    store: LocalStore,
}

impl SessionStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Load the stored profile. `None` means anonymous.
    ///
    /// Never fails: a malformed record is logged and treated as absent.
    pub fn load(&self) -> Option<UserProfile> {
        let raw = self.store.get(keys::USER_PROFILE)?;
        match serde_json::from_str::<Option<UserProfile>>(&raw) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed stored profile");
                None
            }
        }
    }

    /// Store the profile, replacing any previous one wholesale.
    pub fn save(&self, profile: &UserProfile) -> Result<(), AppError> {
        let raw = serde_json::to_string(profile).map_err(|e| AppError::Storage(e.to_string()))?;
        self.store.set(keys::USER_PROFILE, &raw)?;
        tracing::debug!(user_id = ?profile.user_id, "Stored user profile");
        Ok(())
    }

    /// Forget the profile (sign-out).
    pub fn clear(&self) -> Result<(), AppError> {
        self.store.remove(keys::USER_PROFILE)
    }

    pub fn theme(&self) -> Theme {
        Theme::from_stored(self.store.get(keys::THEME).as_deref())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), AppError> {
        self.store.set(keys::THEME, theme.as_stored())
    }

    pub fn pending_email(&self) -> Option<String> {
        self.store.get(keys::PENDING_EMAIL)
    }

    pub fn set_pending_email(&self, email: &str) -> Result<(), AppError> {
        self.store.set(keys::PENDING_EMAIL, email)
    }
}
