// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Embedded player handles.
//!
//! Every rendered item owns exactly one player widget. Widgets become usable
//! only after the player library reports readiness, so each handle tracks a
//! small state machine and commands sent before readiness are dropped.

use crate::error::AppError;
use crate::feed::SlotKey;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one widget instance across resets (slot keys get reused).
pub type WidgetId = u64;

/// A third-party player widget bound to one DOM slot.
pub trait PlayerWidget: Send + Sync {
    fn play_video(&mut self);
    fn pause_video(&mut self);
    fn mute(&mut self);
    fn un_mute(&mut self);
}

/// Constructs widgets. Readiness and errors arrive later as [`PlayerEvent`]s.
pub trait PlayerFactory: Send + Sync {
    fn create(&self, config: &PlayerConfig) -> Result<Box<dyn PlayerWidget>, AppError>;
}

/// Construction config handed to the player library.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    #[serde(skip)]
    pub widget_id: WidgetId,
    #[serde(skip)]
    pub element_id: String,
    pub height: String,
    pub width: String,
    pub video_id: String,
    pub player_vars: PlayerVars,
}

/// Player parameters: no autoplay, no controls, looping, starts muted.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerVars {
    pub autoplay: u8,
    pub controls: u8,
    pub rel: u8,
    #[serde(rename = "loop")]
    pub loop_: u8,
    /// Looping a single video requires it to be its own playlist
    pub playlist: String,
    pub mute: u8,
    pub playsinline: u8,
}

impl PlayerConfig {
    fn new(widget_id: WidgetId, slot: &SlotKey, video_id: &str) -> Self {
        Self {
            widget_id,
            element_id: slot.element_id(),
            height: "100%".to_string(),
            width: "100%".to_string(),
            video_id: video_id.to_string(),
            player_vars: PlayerVars {
                autoplay: 0,
                controls: 0,
                rel: 0,
                loop_: 1,
                playlist: video_id.to_string(),
                mute: 1,
                playsinline: 1,
            },
        }
    }
}

/// Lifecycle of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Uninitialized,
    Ready,
    Error,
}

/// Callback from the player library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub slot: SlotKey,
    pub widget_id: WidgetId,
    pub kind: PlayerEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEventKind {
    Ready,
    /// Player library error code
    Error(i32),
}

impl PlayerEvent {
    pub fn ready(slot: SlotKey, widget_id: WidgetId) -> Self {
        Self {
            slot,
            widget_id,
            kind: PlayerEventKind::Ready,
        }
    }

    pub fn error(slot: SlotKey, widget_id: WidgetId, code: i32) -> Self {
        Self {
            slot,
            widget_id,
            kind: PlayerEventKind::Error(code),
        }
    }
}

/// One widget plus its readiness state.
pub struct PlayerHandle {
    item_id: String,
    widget_id: WidgetId,
    widget: Option<Box<dyn PlayerWidget>>,
    state: PlayerState,
}

impl PlayerHandle {
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Whether commands reach the widget right now.
    pub fn can_control(&self) -> bool {
        self.state == PlayerState::Ready && self.widget.is_some()
    }

    fn ready_widget(&mut self) -> Option<&mut Box<dyn PlayerWidget>> {
        if self.state != PlayerState::Ready {
            return None;
        }
        self.widget.as_mut()
    }
}

/// All player handles of one feed, keyed by slot.
pub struct PlayerRegistry {
    factory: Arc<dyn PlayerFactory>,
    handles: DashMap<SlotKey, PlayerHandle>,
    next_widget_id: AtomicU64,
    /// Slot that starts playing as soon as its widget is ready
    autoplay_slot: Option<SlotKey>,
}

impl PlayerRegistry {
    pub fn new(factory: Arc<dyn PlayerFactory>, autoplay_slot: Option<SlotKey>) -> Self {
        Self {
            factory,
            handles: DashMap::new(),
            next_widget_id: AtomicU64::new(1),
            autoplay_slot,
        }
    }

    /// Create the handle for `slot`, replacing any previous one.
    ///
    /// Widget construction failures leave the handle in the error state.
    pub fn create(&self, item_id: &str, slot: SlotKey) -> PlayerState {
        let widget_id = self.next_widget_id.fetch_add(1, Ordering::Relaxed);
        let config = PlayerConfig::new(widget_id, &slot, item_id);

        let (widget, state) = match self.factory.create(&config) {
            Ok(widget) => (Some(widget), PlayerState::Uninitialized),
            Err(e) => {
                tracing::error!(slot = %slot, error = %e, "Error creating player");
                (None, PlayerState::Error)
            }
        };

        let handle = PlayerHandle {
            item_id: item_id.to_string(),
            widget_id,
            widget,
            state,
        };

        if self.handles.insert(slot.clone(), handle).is_some() {
            tracing::debug!(slot = %slot, "Replaced existing player handle");
        }
        state
    }

    /// Apply a readiness or error callback from the player library.
    ///
    /// Events for widgets that were since replaced or dropped are ignored.
    pub fn handle_event(&self, event: &PlayerEvent) {
        let autoplay = {
            let Some(mut handle) = self.handles.get_mut(&event.slot) else {
                tracing::debug!(slot = %event.slot, "Event for unknown player slot");
                return;
            };
            if handle.widget_id != event.widget_id {
                tracing::debug!(slot = %event.slot, "Event from a replaced player widget");
                return;
            }

            match event.kind {
                PlayerEventKind::Ready => {
                    if handle.state == PlayerState::Uninitialized {
                        handle.state = PlayerState::Ready;
                    }
                    self.autoplay_slot.as_ref() == Some(&event.slot)
                }
                PlayerEventKind::Error(code) => {
                    tracing::warn!(
                        slot = %event.slot,
                        item_id = %handle.item_id,
                        code,
                        "Player error"
                    );
                    handle.state = PlayerState::Error;
                    handle.widget = None;
                    false
                }
            }
        };

        if autoplay {
            self.play(&event.slot);
        }
    }

    fn command<F>(&self, slot: &SlotKey, name: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Box<dyn PlayerWidget>),
    {
        let Some(mut handle) = self.handles.get_mut(slot) else {
            return false;
        };
        match handle.ready_widget() {
            Some(widget) => {
                apply(widget);
                true
            }
            None => {
                tracing::debug!(slot = %slot, command = name, "Player not ready, ignoring");
                false
            }
        }
    }

    /// Start playback. Returns whether the widget received the command.
    pub fn play(&self, slot: &SlotKey) -> bool {
        self.command(slot, "play", |w| w.play_video())
    }

    pub fn pause(&self, slot: &SlotKey) -> bool {
        self.command(slot, "pause", |w| w.pause_video())
    }

    pub fn mute(&self, slot: &SlotKey) -> bool {
        self.command(slot, "mute", |w| w.mute())
    }

    pub fn unmute(&self, slot: &SlotKey) -> bool {
        self.command(slot, "unmute", |w| w.un_mute())
    }

    pub fn state(&self, slot: &SlotKey) -> Option<PlayerState> {
        self.handles.get(slot).map(|h| h.state())
    }

    /// Capability probe: would `play` reach a widget right now?
    pub fn can_play(&self, slot: &SlotKey) -> bool {
        self.handles.get(slot).is_some_and(|h| h.can_control())
    }

    /// Handles still waiting for their widget to become ready.
    pub fn pending(&self) -> Vec<(SlotKey, WidgetId)> {
        self.handles
            .iter()
            .filter(|entry| entry.state == PlayerState::Uninitialized)
            .map(|entry| (entry.key().clone(), entry.widget_id))
            .collect()
    }

    /// Drop every handle (feed reset).
    pub fn clear(&self) {
        self.handles.clear();
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Headless player library: widgets that only log what they are told.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPlayerFactory;

struct TracingPlayer {
    element_id: String,
    video_id: String,
}

impl PlayerFactory for TracingPlayerFactory {
    fn create(&self, config: &PlayerConfig) -> Result<Box<dyn PlayerWidget>, AppError> {
        tracing::debug!(
            element = %config.element_id,
            video_id = %config.video_id,
            "Created headless player"
        );
        Ok(Box::new(TracingPlayer {
            element_id: config.element_id.clone(),
            video_id: config.video_id.clone(),
        }))
    }
}

impl PlayerWidget for TracingPlayer {
    fn play_video(&mut self) {
        tracing::info!(element = %self.element_id, video_id = %self.video_id, "play");
    }

    fn pause_video(&mut self) {
        tracing::info!(element = %self.element_id, video_id = %self.video_id, "pause");
    }

    fn mute(&mut self) {
        tracing::debug!(element = %self.element_id, "mute");
    }

    fn un_mute(&mut self) {
        tracing::debug!(element = %self.element_id, "unmute");
    }
}
