// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed session: cursor-based pagination wired to rendering, players, and
//! visibility.
//!
//! Guarantees:
//! - at most one non-reset page request is outstanding at a time
//! - the cursor advances by the number of items the feed returned, never by
//!   the requested limit
//! - an empty page stops pagination until the next reset
//! - a reset clears items and handles before anything new is inserted, and
//!   responses belonging to an older reset generation are discarded
//! - failed requests leave the cursor untouched and do not end the feed
//! - a grid item ID is rendered at most once per generation

use crate::error::AppError;
use crate::feed::registry::{PlayerEvent, PlayerFactory, PlayerRegistry};
use crate::feed::render::{ListSurface, Renderer};
use crate::feed::visibility::{IntersectionEntry, VisibilityAction, VisibilityController};
use crate::feed::{FeedSource, SlotKey};
use crate::models::{FeedItem, FeedMode, FeedRequest, Locale};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Page sizes: the first page of a generation may be larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub initial: u32,
    pub page: u32,
}

/// Result of a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Items were appended; more may follow.
    Loaded { appended: usize },
    /// The feed returned an empty page (a pinned seed item may still have
    /// been appended). Pagination is stopped.
    Exhausted { appended: usize },
    /// Another page request is outstanding.
    Skipped,
    /// A reset happened while the request was outstanding; nothing applied.
    Stale,
}

struct SessionState {
    cursor: u64,
    generation: u64,
    /// Generation of the outstanding request, if any
    in_flight: Option<u64>,
    exhausted: bool,
    rendered: Vec<(String, SlotKey)>,
    surface: Box<dyn ListSurface>,
    controller: VisibilityController,
}

/// One feed's pagination, rendering, and playback state.
pub struct FeedSession {
    mode: FeedMode,
    locale: Locale,
    limits: PageLimits,
    source: Arc<dyn FeedSource>,
    registry: Arc<PlayerRegistry>,
    renderer: Renderer,
    state: Mutex<SessionState>,
}

/// Clears the in-flight marker when a request finishes or is abandoned.
struct InFlight<'a> {
    session: &'a FeedSession,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        if state.in_flight == Some(self.generation) {
            state.in_flight = None;
        }
    }
}

impl FeedSession {
    /// Create a session and attach the sentinel to an empty surface.
    pub fn new(
        mode: FeedMode,
        locale: Locale,
        limits: PageLimits,
        source: Arc<dyn FeedSource>,
        players: Arc<dyn PlayerFactory>,
        mut surface: Box<dyn ListSurface>,
    ) -> Self {
        let autoplay_slot = match mode {
            FeedMode::Reel => Some(SlotKey::Index(0)),
            FeedMode::Grid => None,
        };

        let mut controller = VisibilityController::new(mode.unmutes_on_play());
        surface.clear();
        surface.append_sentinel();
        controller.observe_sentinel();

        Self {
            mode,
            locale,
            limits,
            source,
            registry: Arc::new(PlayerRegistry::new(players, autoplay_slot)),
            renderer: Renderer::new(mode),
            state: Mutex::new(SessionState {
                cursor: 0,
                generation: 0,
                in_flight: None,
                exhausted: false,
                rendered: Vec::new(),
                surface,
                controller,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request the next page (or, with `reset`, start over from offset 0).
    ///
    /// `seed_item_id` only applies to resets: the item is resolved by ID and
    /// shown first, and removed from the page if the page contains it too.
    pub async fn fetch_page(
        &self,
        reset: bool,
        seed_item_id: Option<&str>,
    ) -> Result<FetchOutcome, AppError> {
        let (generation, request) = {
            let mut state = self.lock();

            if reset {
                state.generation += 1;
                state.cursor = 0;
                state.exhausted = false;
                state.rendered.clear();
                state.surface.clear();
                self.registry.clear();
                state.controller.disconnect();
                state.surface.append_sentinel();
                state.controller.observe_sentinel();
                tracing::info!(mode = %self.mode, generation = state.generation, "Feed reset");
            } else if state.in_flight.is_some() {
                tracing::debug!(mode = %self.mode, "Page request already in flight");
                return Ok(FetchOutcome::Skipped);
            } else if state.exhausted {
                return Ok(FetchOutcome::Exhausted { appended: 0 });
            }

            state.in_flight = Some(state.generation);

            let limit = if reset || state.cursor == 0 {
                self.limits.initial
            } else {
                self.limits.page
            };

            let request = FeedRequest {
                state: self.locale.state.clone(),
                language: self.locale.language.clone(),
                limit,
                skip: state.cursor,
                is_short: self.mode.is_short(),
            };
            (state.generation, request)
        };
        let _in_flight = InFlight {
            session: self,
            generation,
        };

        tracing::debug!(
            mode = %self.mode,
            skip = request.skip,
            limit = request.limit,
            "Requesting feed page"
        );

        let page = match self.source.fetch_page(&request).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    mode = %self.mode,
                    skip = request.skip,
                    error = %e,
                    "Error fetching feed page"
                );
                return Err(e);
            }
        };
        let page_len = page.len();

        let items = match seed_item_id.filter(|_| reset) {
            Some(seed) => self.with_seed(seed, page).await,
            None => page,
        };

        let mut state = self.lock();
        if state.generation != generation {
            tracing::warn!(
                mode = %self.mode,
                stale = generation,
                current = state.generation,
                "Discarding page from an older feed generation"
            );
            return Ok(FetchOutcome::Stale);
        }

        let mut appended = 0;
        for item in items {
            if self.mode == FeedMode::Grid && state.rendered.iter().any(|(id, _)| *id == item.id) {
                tracing::debug!(item_id = %item.id, "Skipping item already on the grid");
                continue;
            }
            self.append(&mut state, item);
            appended += 1;
        }
        state.cursor += page_len as u64;

        if page_len == 0 {
            state.exhausted = true;
            state.controller.unobserve_sentinel();
            tracing::info!(mode = %self.mode, cursor = state.cursor, "Feed exhausted");
            return Ok(FetchOutcome::Exhausted { appended });
        }

        tracing::debug!(mode = %self.mode, appended, cursor = state.cursor, "Feed page appended");
        Ok(FetchOutcome::Loaded { appended })
    }

    /// Resolve the seed item and put it first, dropping its duplicate.
    async fn with_seed(&self, seed: &str, mut items: Vec<FeedItem>) -> Vec<FeedItem> {
        match self.source.fetch_item(seed).await {
            Ok(item) => {
                items.retain(|i| i.id != seed);
                items.insert(0, item);
            }
            Err(e) => {
                tracing::warn!(seed, error = %e, "Seed item unavailable, showing page without it");
            }
        }
        items
    }

    fn append(&self, state: &mut SessionState, item: FeedItem) {
        let slot = self.renderer.slot_for(state.rendered.len(), &item);
        state.surface.insert(self.renderer.render(&item, slot.clone()));
        self.registry.create(&item.id, slot.clone());
        state.controller.observe(slot.clone());
        state.rendered.push((item.id, slot));
    }

    /// Apply a batch of viewport observations.
    ///
    /// Drives play/pause on the registry; a sentinel coming onscreen loads
    /// the next page, whose outcome is returned.
    pub async fn handle_intersections(
        &self,
        entries: &[IntersectionEntry],
    ) -> Result<Option<FetchOutcome>, AppError> {
        let load_more = {
            let mut state = self.lock();
            let mut load_more = false;

            for action in state.controller.process(entries) {
                match action {
                    VisibilityAction::Play { slot, unmute } => {
                        if self.registry.play(&slot) && unmute {
                            self.registry.unmute(&slot);
                        }
                    }
                    VisibilityAction::Pause { slot } => {
                        self.registry.pause(&slot);
                    }
                    VisibilityAction::LoadMore => load_more = state.in_flight.is_none(),
                }
            }
            load_more
        };

        if !load_more {
            return Ok(None);
        }
        self.fetch_page(false, None).await.map(Some)
    }

    /// Apply a widget readiness/error callback.
    pub fn handle_player_event(&self, event: &PlayerEvent) {
        self.registry.handle_event(event);
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn registry(&self) -> &Arc<PlayerRegistry> {
        &self.registry
    }

    /// Offset of the next page in the server's ordering.
    pub fn cursor(&self) -> u64 {
        self.lock().cursor
    }

    /// Incremented on every reset.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_fetching(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().exhausted
    }

    /// Whether the sentinel is still observed.
    pub fn is_paginating(&self) -> bool {
        self.lock().controller.is_paginating()
    }

    /// Rendered item IDs in arrival order.
    pub fn rendered_ids(&self) -> Vec<String> {
        self.lock().rendered.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Slot keys of rendered items in arrival order.
    pub fn rendered_slots(&self) -> Vec<SlotKey> {
        self.lock()
            .rendered
            .iter()
            .map(|(_, slot)| slot.clone())
            .collect()
    }
}
