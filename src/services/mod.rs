// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend, identity, and auth flows.

pub mod api;
pub mod auth;
pub mod identity;

pub use api::{BackendClient, RemoteProfile};
pub use auth::{AuthFlow, SignupForm};
pub use identity::{IdentityProvider, IdentityUser, SignInMethod, StaticTokenIdentity};
