// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Triangle feed walker
//!
//! Runs a feed headlessly: loads the first page, then scrolls one item per
//! step, feeding viewport observations and player readiness through the same
//! paths a browser host would.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triangle_feed::{
    config::Config,
    feed::{IntersectionEntry, ListSurface, MemorySurface, PlayerEvent, TracingPlayerFactory},
    models::FeedMode,
    routes::{missing_profile_redirect, signed_out_redirect, Page},
    services::{AuthFlow, BackendClient, IdentityProvider, StaticTokenIdentity},
    store::{LocalStore, SessionStore},
    FeedApp,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        mode = %config.feed_mode,
        "Starting Triangle feed walker"
    );

    let store = LocalStore::open(&config.store_path)?;
    let session = SessionStore::new(store);
    tracing::info!(theme = session.theme().as_stored(), "Session store opened");

    let backend = BackendClient::new(&config)?;
    let identity = StaticTokenIdentity::new(config.identity_token.clone());
    let user = identity.current_user().await;

    if let Some(user) = &user {
        if session.load().is_none() {
            let next = AuthFlow::new(&identity, &backend, &session)
                .handle_user_session(user)
                .await;
            tracing::info!(uid = %user.uid, next = %next, "Synced profile from backend");
        }
    }

    let page = match config.feed_mode {
        FeedMode::Reel => Page::Short,
        FeedMode::Grid => Page::Index,
    };
    let redirect = match &user {
        None => signed_out_redirect(page),
        Some(_) => missing_profile_redirect(page, session.load().is_some()),
    };
    if let Some(target) = redirect {
        tracing::warn!(page = %page, redirect = %target, "Feed requires sign-in");
        return Ok(());
    }

    let app = FeedApp {
        config,
        backend,
        session,
    };

    let surface = MemorySurface::new();
    let feed = app.open_feed(
        app.config.feed_mode,
        Arc::new(TracingPlayerFactory),
        Box::new(surface.clone()),
    );

    let seed = app.config.seed_video_id.as_deref();
    let outcome = feed.fetch_page(true, seed).await?;
    tracing::info!(?outcome, rendered = surface.len(), "First page loaded");

    for step in 0..app.config.walk_steps {
        for (slot, widget_id) in feed.registry().pending() {
            feed.handle_player_event(&PlayerEvent::ready(slot, widget_id));
        }

        let slots = feed.rendered_slots();
        let Some(current) = slots.get(step) else {
            tracing::info!(step, "Reached the end of the feed");
            break;
        };

        let mut entries = vec![IntersectionEntry::item(current.clone(), 1.0)];
        if step > 0 {
            entries.push(IntersectionEntry::item(slots[step - 1].clone(), 0.0));
        }
        if step + 1 == slots.len() {
            entries.push(IntersectionEntry::sentinel(1.0));
        }

        match feed.handle_intersections(&entries).await {
            Ok(Some(outcome)) => tracing::info!(step, ?outcome, "Loaded more"),
            Ok(None) => {}
            Err(e) => tracing::error!(step, error = %e, "Loading more failed"),
        }

        if step + 1 == slots.len() {
            // Sentinel scrolls away again as new items push it down.
            if let Err(e) = feed
                .handle_intersections(&[IntersectionEntry::sentinel(0.0)])
                .await
            {
                tracing::error!(step, error = %e, "Applying sentinel exit failed");
            }
        }
    }

    tracing::info!(
        cursor = feed.cursor(),
        rendered = surface.len(),
        exhausted = feed.is_exhausted(),
        "Walk finished"
    );
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("triangle_feed=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
