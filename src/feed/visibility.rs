// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Viewport visibility tracking.
//!
//! The host reports intersection ratios for observed elements; the controller
//! turns offscreen/onscreen transitions into playback and pagination actions.

use crate::feed::SlotKey;
use std::collections::HashMap;

/// Fraction of an element's box that must be inside the viewport.
pub const VISIBILITY_THRESHOLD: f64 = 0.75;

/// An observed element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Item(SlotKey),
    /// Trailing element whose visibility means "load more"
    Sentinel,
}

/// One intersection observation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: Target,
    /// Visible fraction of the element's bounding box, 0.0..=1.0
    pub ratio: f64,
}

impl IntersectionEntry {
    pub fn item(slot: SlotKey, ratio: f64) -> Self {
        Self {
            target: Target::Item(slot),
            ratio,
        }
    }

    pub fn sentinel(ratio: f64) -> Self {
        Self {
            target: Target::Sentinel,
            ratio,
        }
    }

    pub fn is_intersecting(&self) -> bool {
        self.ratio >= VISIBILITY_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Offscreen,
    Onscreen,
}

impl Visibility {
    fn of(entry: &IntersectionEntry) -> Self {
        if entry.is_intersecting() {
            Visibility::Onscreen
        } else {
            Visibility::Offscreen
        }
    }
}

/// What to do in response to a batch of observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityAction {
    Play { slot: SlotKey, unmute: bool },
    Pause { slot: SlotKey },
    LoadMore,
}

/// Per-element visibility state for one feed.
#[derive(Debug)]
pub struct VisibilityController {
    unmute_on_play: bool,
    items: HashMap<SlotKey, Visibility>,
    sentinel: Option<Visibility>,
}

impl VisibilityController {
    pub fn new(unmute_on_play: bool) -> Self {
        Self {
            unmute_on_play,
            items: HashMap::new(),
            sentinel: None,
        }
    }

    /// Start observing an item. It is offscreen until reported otherwise.
    pub fn observe(&mut self, slot: SlotKey) {
        self.items.insert(slot, Visibility::Offscreen);
    }

    /// Start observing a freshly appended sentinel.
    pub fn observe_sentinel(&mut self) {
        self.sentinel = Some(Visibility::Offscreen);
    }

    /// Stop pagination; items keep driving playback.
    pub fn unobserve_sentinel(&mut self) {
        self.sentinel = None;
    }

    /// Forget every observed element.
    pub fn disconnect(&mut self) {
        self.items.clear();
        self.sentinel = None;
    }

    /// Whether a sentinel transition can still request a page.
    pub fn is_paginating(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Apply a batch of observations.
    ///
    /// Entries for unobserved elements are ignored. Each element's net
    /// transition over the batch counts once. Plays come before pauses so
    /// an item scrolling in starts before its neighbour stops.
    pub fn process(&mut self, entries: &[IntersectionEntry]) -> Vec<VisibilityAction> {
        // (initial state, order of first appearance) per item touched in this batch
        let mut touched: Vec<(SlotKey, Visibility)> = Vec::new();
        let mut sentinel_before = None;

        for entry in entries {
            let now = Visibility::of(entry);
            match &entry.target {
                Target::Sentinel => {
                    let Some(state) = self.sentinel.as_mut() else {
                        continue;
                    };
                    sentinel_before.get_or_insert(*state);
                    *state = now;
                }
                Target::Item(slot) => {
                    let Some(state) = self.items.get_mut(slot) else {
                        tracing::trace!(slot = %slot, "Observation for unobserved item");
                        continue;
                    };
                    if !touched.iter().any(|(s, _)| s == slot) {
                        touched.push((slot.clone(), *state));
                    }
                    *state = now;
                }
            }
        }

        let mut plays = Vec::new();
        let mut pauses = Vec::new();
        for (slot, before) in touched {
            let Some(&after) = self.items.get(&slot) else {
                continue;
            };
            match (before, after) {
                (Visibility::Offscreen, Visibility::Onscreen) => plays.push(VisibilityAction::Play {
                    slot,
                    unmute: self.unmute_on_play,
                }),
                (Visibility::Onscreen, Visibility::Offscreen) => {
                    pauses.push(VisibilityAction::Pause { slot })
                }
                _ => {}
            }
        }

        let mut actions = plays;
        actions.append(&mut pauses);

        if sentinel_before == Some(Visibility::Offscreen)
            && self.sentinel == Some(Visibility::Onscreen)
        {
            actions.push(VisibilityAction::LoadMore);
        }

        actions
    }
}
