// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod feed;
pub mod theme;
pub mod user;

pub use feed::{format_count, FeedItem, FeedMode, FeedRequest};
pub use theme::Theme;
pub use user::{
    fallback_avatar_url, Locale, ProfileUpdate, Registration, UserProfile, DEFAULT_LANGUAGE,
    DEFAULT_STATE,
};
