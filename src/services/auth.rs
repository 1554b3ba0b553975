// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, signup, onboarding, and sign-out flows.
//!
//! Each flow returns the [`Page`] the client should show next. Failures the
//! user has to see are returned as errors; callers turn them into notices via
//! the `*_notice` helpers on [`AppError`].

use crate::error::AppError;
use crate::models::{fallback_avatar_url, ProfileUpdate, Registration, UserProfile};
use crate::routes::{signed_out_redirect, Page};
use crate::services::api::BackendClient;
use crate::services::identity::{IdentityProvider, IdentityUser};
use crate::store::SessionStore;
use std::sync::atomic::{AtomicBool, Ordering};

/// Signup form input.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Clears the popup flag when a popup sign-in finishes or is abandoned.
struct PopupPending<'a>(&'a AtomicBool);

impl Drop for PopupPending<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates identity, backend profile API, and local session state.
pub struct AuthFlow<'a> {
    identity: &'a dyn IdentityProvider,
    api: &'a BackendClient,
    session: &'a SessionStore,
    popup_pending: AtomicBool,
}

impl<'a> AuthFlow<'a> {
    pub fn new(
        identity: &'a dyn IdentityProvider,
        api: &'a BackendClient,
        session: &'a SessionStore,
    ) -> Self {
        Self {
            identity,
            api,
            session,
            popup_pending: AtomicBool::new(false),
        }
    }

    /// Sync the backend profile into local storage after sign-in.
    ///
    /// Unreachable backends degrade to whatever is stored locally.
    pub async fn handle_user_session(&self, user: &IdentityUser) -> Page {
        match self.sync_profile(user).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, uid = %user.uid, "Session handling failed");
                if self.session.load().is_some() {
                    Page::Index
                } else {
                    Page::Onboarding
                }
            }
        }
    }

    async fn sync_profile(&self, user: &IdentityUser) -> Result<Page, AppError> {
        let token = self.identity.id_token(true).await?;

        let Some(remote) = self.api.get_profile(&token).await? else {
            tracing::info!(uid = %user.uid, "No backend profile yet");
            return Ok(Page::Onboarding);
        };

        let photo_url = remote
            .photo_url
            .filter(|url| !url.is_empty())
            .or_else(|| user.photo_url.clone())
            .unwrap_or_else(|| fallback_avatar_url(user.avatar_name()));

        let profile = UserProfile {
            user_id: remote.user_id.or_else(|| Some(user.uid.clone())),
            email: remote.email.or_else(|| user.email.clone()),
            state: remote.state,
            language: remote.language,
            photo_url: Some(photo_url),
        };
        self.session.save(&profile)?;

        Ok(Page::Index)
    }

    /// Sign in with an email or a username plus password.
    pub async fn login(&self, login_input: &str, password: &str) -> Result<Page, AppError> {
        let email = if login_input.contains('@') {
            login_input.to_string()
        } else {
            self.api.lookup_email(login_input).await.map_err(|e| {
                tracing::warn!(username = %login_input, error = %e, "Username lookup failed");
                AppError::NotFound(format!("User ID {login_input}"))
            })?
        };

        let user = self.identity.sign_in_with_password(&email, password).await?;

        if !user.email_verified {
            self.session.set_pending_email(&email)?;
            return Ok(Page::VerifyEmail);
        }

        Ok(self.handle_user_session(&user).await)
    }

    /// Popup sign-in. Returns `Ok(None)` if one is already in progress.
    pub async fn google_login(&self) -> Result<Option<Page>, AppError> {
        if self.popup_pending.swap(true, Ordering::AcqRel) {
            tracing::debug!("Popup sign-in already pending");
            return Ok(None);
        }

        let user = {
            let _pending = PopupPending(&self.popup_pending);
            self.identity.sign_in_with_popup().await?
        };
        Ok(Some(self.handle_user_session(&user).await))
    }

    /// Create an account, register it with the backend, and start verification.
    pub async fn signup(&self, form: &SignupForm) -> Result<Page, AppError> {
        validate_signup(form)?;

        self.identity.create_user(&form.email, &form.password).await?;
        self.identity.update_display_name(&form.name).await?;
        let token = self.identity.id_token(false).await?;

        let registration = Registration {
            username: form.username.clone(),
            email: form.email.clone(),
            display_name: form.name.clone(),
        };

        if let Err(e) = self.api.register(&token, &registration).await {
            tracing::warn!(error = %e, "Backend registration failed, rolling back identity");
            if let Err(rollback) = self.identity.delete_current_user().await {
                tracing::error!(error = %rollback, "Failed to delete identity after signup failure");
            }
            return Err(e);
        }

        self.identity.send_email_verification().await?;
        self.session.set_pending_email(&form.email)?;
        Ok(Page::VerifyEmail)
    }

    /// Save the region/language chosen during onboarding.
    pub async fn submit_onboarding(&self, state: &str, language: &str) -> Result<Page, AppError> {
        if state.is_empty() || language.is_empty() {
            return Err(AppError::BadRequest(
                "Please select both state and language.".to_string(),
            ));
        }

        let user = self.identity.current_user().await.ok_or_else(|| {
            AppError::BadRequest("You must be signed in to save preferences.".to_string())
        })?;

        let photo_url = user
            .photo_url
            .clone()
            .unwrap_or_else(|| fallback_avatar_url(user.avatar_name()));

        let update = ProfileUpdate {
            state: state.to_string(),
            language: language.to_string(),
            photo_url: photo_url.clone(),
        };

        let saved = match self.identity.id_token(false).await {
            Ok(token) => self.api.save_profile(&token, &update).await,
            Err(e) => Err(e),
        };

        let profile = match saved {
            Ok(()) => UserProfile {
                user_id: Some(user.uid.clone()),
                email: user.email.clone(),
                state: Some(update.state),
                language: Some(update.language),
                photo_url: Some(photo_url),
            },
            Err(e) => {
                tracing::error!(error = %e, "Saving onboarding data failed, keeping local copy");
                UserProfile {
                    user_id: Some(user.uid.clone()),
                    email: user.email.clone(),
                    state: Some(update.state),
                    language: Some(update.language),
                    photo_url: None,
                }
            }
        };

        self.session.save(&profile)?;
        Ok(Page::Index)
    }

    /// Sign out and forget the local profile.
    pub async fn logout(&self) -> Result<Page, AppError> {
        self.identity.sign_out().await?;
        self.session.clear()?;
        Ok(Page::Login)
    }

    /// React to an identity state change while `page` is shown.
    ///
    /// Returns the page to navigate to, or `None` to stay.
    pub async fn on_auth_state_changed(
        &self,
        page: Page,
        user: Option<&IdentityUser>,
    ) -> Result<Option<Page>, AppError> {
        let Some(user) = user else {
            return Ok(signed_out_redirect(page));
        };

        if user.needs_email_verification() {
            if page == Page::VerifyEmail {
                return Ok(None);
            }
            if let Some(email) = &user.email {
                self.session.set_pending_email(email)?;
            }
            return Ok(Some(Page::VerifyEmail));
        }

        if page.is_auth_page() {
            return Ok(Some(self.handle_user_session(user).await));
        }

        Ok(None)
    }
}

fn validate_signup(form: &SignupForm) -> Result<(), AppError> {
    if form.password != form.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match.".to_string()));
    }
    if form.username.trim().is_empty() || form.username.contains('@') {
        return Err(AppError::BadRequest(
            "Username must be non-empty and must not contain '@'.".to_string(),
        ));
    }
    if !form.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address.".to_string()));
    }
    Ok(())
}
