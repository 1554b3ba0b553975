// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed items, requests, and feed variants.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One video in a feed page. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Video ID (also the embedded player's video ID)
    #[serde(alias = "video_id")]
    pub id: String,
    /// Channel display name
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comment_count: u64,
    #[serde(default)]
    pub is_short: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// ISO 8601 duration (e.g. "PT45S")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl FeedItem {
    /// Minimal item, mostly useful for tests and fixtures.
    pub fn new(id: impl Into<String>, channel: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel: channel.into(),
            title: title.into(),
            likes: 0,
            comment_count: 0,
            is_short: false,
            thumbnail: None,
            views: 0,
            published_at: None,
            duration: None,
        }
    }
}

/// Body of `POST /feed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRequest {
    pub state: String,
    pub language: String,
    pub limit: u32,
    pub skip: u64,
    /// `Some(true)` shorts only, `Some(false)` long-form only, `None` mixed
    pub is_short: Option<bool>,
}

/// Feed variant: vertical reels or the mixed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedMode {
    Reel,
    Grid,
}

impl FeedMode {
    /// Value of `is_short` sent with every request of this feed.
    pub fn is_short(self) -> Option<bool> {
        match self {
            FeedMode::Reel => Some(true),
            FeedMode::Grid => None,
        }
    }

    /// Whether a player coming onscreen is also unmuted.
    pub fn unmutes_on_play(self) -> bool {
        matches!(self, FeedMode::Reel)
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedMode::Reel => f.write_str("reel"),
            FeedMode::Grid => f.write_str("grid"),
        }
    }
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reel" | "reels" | "short" | "shorts" => Ok(FeedMode::Reel),
            "grid" | "mixed" | "feed" => Ok(FeedMode::Grid),
            other => Err(format!("unknown feed mode: {other}")),
        }
    }
}

/// Format a like/comment counter the way the feed displays it.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Accept counters sent as numbers, numeric strings, or null.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => n,
        Some(Raw::Float(f)) if f.is_finite() && f > 0.0 => f as u64,
        Some(Raw::Text(s)) => s
            .trim()
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0),
        _ => 0,
    })
}
