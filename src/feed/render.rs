// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed item fragments and the surface they are inserted into.

use crate::feed::SlotKey;
use crate::models::{fallback_avatar_url, format_count, FeedItem, FeedMode};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Rendered markup for one feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub item_id: String,
    pub slot: SlotKey,
    pub mode: FeedMode,
    pub channel: String,
    pub title: String,
    pub likes: String,
    pub comments: String,
    /// Channel avatar (grid cards only)
    pub avatar_url: Option<String>,
}

impl Fragment {
    /// HTML for the item. Text fields are escaped.
    pub fn to_html(&self) -> String {
        let id = escape_html(&self.item_id);
        let slot = escape_html(&self.slot.element_id());
        let channel = escape_html(&self.channel);
        let title = escape_html(&self.title);

        match self.mode {
            FeedMode::Reel => format!(
                r#"<div class="reel-item" data-video-id="{id}"><div id="{slot}" class="reel-player"></div><div class="reel-overlay"><div class="reel-info"><h3 class="reel-username">{channel}</h3><p class="reel-caption">{title}</p></div></div><div class="reel-actions"><button class="reel-action-btn"><i class="far fa-heart"></i><span>{likes}</span></button><button class="reel-action-btn"><i class="far fa-comment"></i><span>{comments}</span></button><button class="reel-action-btn"><i class="fas fa-share"></i></button><button class="reel-action-btn"><i class="fas fa-ellipsis-v"></i></button></div></div>"#,
                likes = self.likes,
                comments = self.comments,
            ),
            FeedMode::Grid => format!(
                r#"<div class="video-card" data-video-id="{id}"><div id="{slot}" class="video-player"></div><div class="video-overlay"><div class="video-header"><img src="{avatar}" class="channel-avatar-small"><span class="channel-name-small">{channel}</span></div><div class="video-footer"><div class="video-info"><h1 class="video-title">{title}</h1></div><div class="video-actions-vertical"><button class="video-action-btn"><i class="far fa-heart"></i><span>{likes}</span></button><button class="video-action-btn"><i class="far fa-comment"></i><span>{comments}</span></button><button class="video-action-btn"><i class="fas fa-share"></i></button><button class="video-action-btn"><i class="far fa-bookmark"></i></button></div></div></div></div>"#,
                avatar = escape_html(self.avatar_url.as_deref().unwrap_or("")),
                likes = self.likes,
                comments = self.comments,
            ),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Builds fragments for one feed variant.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    mode: FeedMode,
}

impl Renderer {
    pub fn new(mode: FeedMode) -> Self {
        Self { mode }
    }

    /// Slot key for the item rendered at `position` (0-based, arrival order).
    pub fn slot_for(&self, position: usize, item: &FeedItem) -> SlotKey {
        match self.mode {
            FeedMode::Reel => SlotKey::Index(position),
            FeedMode::Grid => SlotKey::Item(item.id.clone()),
        }
    }

    pub fn render(&self, item: &FeedItem, slot: SlotKey) -> Fragment {
        Fragment {
            item_id: item.id.clone(),
            slot,
            mode: self.mode,
            channel: item.channel.clone(),
            title: item.title.clone(),
            likes: format_count(item.likes),
            comments: format_count(item.comment_count),
            avatar_url: match self.mode {
                FeedMode::Grid => Some(fallback_avatar_url(&item.channel)),
                FeedMode::Reel => None,
            },
        }
    }
}

/// Where fragments end up (a DOM container in a browser host).
pub trait ListSurface: Send {
    /// Remove every item and the sentinel.
    fn clear(&mut self);
    /// Insert an item after the last item, before the sentinel if present.
    fn insert(&mut self, fragment: Fragment);
    /// Append a sentinel after the last item, replacing any existing one.
    fn append_sentinel(&mut self);
    /// Number of items (sentinel excluded).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Node of a [`MemorySurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Item(Fragment),
    Sentinel,
}

/// In-memory surface. Clones share the same nodes.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    nodes: Arc<Mutex<Vec<Node>>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all nodes in document order.
    pub fn nodes(&self) -> Vec<Node> {
        self.lock().clone()
    }

    /// Item IDs in document order.
    pub fn item_ids(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|node| match node {
                Node::Item(fragment) => Some(fragment.item_id.clone()),
                Node::Sentinel => None,
            })
            .collect()
    }

    pub fn has_sentinel(&self) -> bool {
        self.lock().iter().any(|node| *node == Node::Sentinel)
    }
}

impl ListSurface for MemorySurface {
    fn clear(&mut self) {
        self.lock().clear();
    }

    fn insert(&mut self, fragment: Fragment) {
        let mut nodes = self.lock();
        match nodes.iter().position(|node| *node == Node::Sentinel) {
            Some(at) => nodes.insert(at, Node::Item(fragment)),
            None => nodes.push(Node::Item(fragment)),
        }
    }

    fn append_sentinel(&mut self) {
        let mut nodes = self.lock();
        nodes.retain(|node| *node != Node::Sentinel);
        nodes.push(Node::Sentinel);
    }

    fn len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|node| matches!(node, Node::Item(_)))
            .count()
    }
}
