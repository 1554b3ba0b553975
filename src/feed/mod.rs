// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Infinite-scroll feed engine.
//!
//! - [`session`]: paginated fetching with a cursor, in-flight guard, and reset generations
//! - [`registry`]: one embedded player handle per rendered item
//! - [`visibility`]: viewport-driven playback and pagination
//! - [`render`]: item fragments and the list surface they are inserted into

pub mod registry;
pub mod render;
pub mod session;
pub mod visibility;

pub use registry::{
    PlayerConfig, PlayerEvent, PlayerEventKind, PlayerFactory, PlayerRegistry, PlayerState,
    PlayerWidget, TracingPlayerFactory, WidgetId,
};
pub use render::{Fragment, ListSurface, MemorySurface, Renderer};
pub use session::{FeedSession, FetchOutcome, PageLimits};
pub use visibility::{
    IntersectionEntry, Target, VisibilityAction, VisibilityController, VISIBILITY_THRESHOLD,
};

use crate::error::AppError;
use crate::models::{FeedItem, FeedRequest};
use async_trait::async_trait;
use std::fmt;

/// Remote source of feed pages.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page, in server order.
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<FeedItem>, AppError>;

    /// Resolve a single item by ID.
    async fn fetch_item(&self, item_id: &str) -> Result<FeedItem, AppError>;
}

/// Key a player handle and its DOM slot are registered under.
///
/// Reels are keyed by position, grid cards by item ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKey {
    Index(usize),
    Item(String),
}

impl SlotKey {
    /// ID of the element the player widget is mounted into.
    pub fn element_id(&self) -> String {
        match self {
            SlotKey::Index(index) => format!("reel-player-{index}"),
            SlotKey::Item(id) => format!("player-{id}"),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_id())
    }
}
