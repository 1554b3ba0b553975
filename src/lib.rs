// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Triangle: short-video feed client
//!
//! This crate provides the client side of the Triangle video feed: session
//! state, the profile/registration API, and an infinite-scrolling feed engine
//! that drives embedded players from viewport visibility.

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use config::Config;
use feed::{FeedSession, FeedSource, ListSurface, PageLimits, PlayerFactory};
use models::{FeedMode, Locale};
use services::BackendClient;
use std::sync::Arc;
use store::SessionStore;

/// Shared client state.
pub struct FeedApp {
    pub config: Config,
    pub backend: BackendClient,
    pub session: SessionStore,
}

impl FeedApp {
    /// Open a feed for the stored profile's locale (or the fallback locale).
    pub fn open_feed(
        &self,
        mode: FeedMode,
        players: Arc<dyn PlayerFactory>,
        surface: Box<dyn ListSurface>,
    ) -> FeedSession {
        let profile = self.session.load();
        let locale = Locale::resolve(profile.as_ref());
        let (initial, page) = self.config.limits_for(mode);

        tracing::info!(
            mode = %mode,
            state = %locale.state,
            language = %locale.language,
            "Opening feed"
        );

        let source: Arc<dyn FeedSource> = Arc::new(self.backend.clone());
        FeedSession::new(
            mode,
            locale,
            PageLimits { initial, page },
            source,
            players,
            surface,
        )
    }
}
