// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API client for the feed and profile endpoints.
//!
//! Handles:
//! - Paginated feed requests and single-video lookups
//! - Profile fetch/update (bearer authenticated, 404 = no profile yet)
//! - Registration and username → email lookup

use crate::config::Config;
use crate::error::AppError;
use crate::feed::FeedSource;
use crate::models::{FeedItem, FeedRequest, ProfileUpdate, Registration};
use async_trait::async_trait;
use serde::Deserialize;

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the configured backend.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Network(format!("failed building HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the signed-in user's profile. `None` if none was created yet.
    pub async fn get_profile(&self, id_token: &str) -> Result<Option<RemoteProfile>, AppError> {
        let url = format!("{}/user/profile", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(id_token)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.check_response_json(response).await.map(Some)
    }

    /// Create or update the signed-in user's profile.
    pub async fn save_profile(
        &self,
        id_token: &str,
        update: &ProfileUpdate,
    ) -> Result<(), AppError> {
        let url = format!("{}/user/profile", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(id_token)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        self.check_response(response).await
    }

    /// Register a freshly created identity with the backend.
    pub async fn register(
        &self,
        id_token: &str,
        registration: &Registration,
    ) -> Result<(), AppError> {
        let url = format!("{}/user/register", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(id_token)
            .json(registration)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        self.check_response(response).await?;
        tracing::info!(username = %registration.username, "Registered user with backend");
        Ok(())
    }

    /// Resolve a username to the email used for sign-in. Unauthenticated.
    pub async fn lookup_email(&self, username: &str) -> Result<String, AppError> {
        let url = format!("{}/user/lookup", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username }))
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("User ID {username}")));
        }

        let lookup: LookupResponse = self.check_response_json(response).await?;
        Ok(lookup.email)
    }

    /// Request one page of the feed.
    pub async fn fetch_feed(&self, request: &FeedRequest) -> Result<Vec<FeedItem>, AppError> {
        let url = format!("{}/feed", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        // The backend answers `null` rather than `[]` on some empty results.
        let items: Option<Vec<FeedItem>> = self.check_response_json(response).await?;
        Ok(items.unwrap_or_default())
    }

    /// Get a single video by ID.
    pub async fn get_video(&self, video_id: &str) -> Result<FeedItem, AppError> {
        let url = format!("{}/video/{}", self.base_url, urlencoding::encode(video_id));

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Video {video_id}")));
        }

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::status_error(response).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))
    }

    async fn status_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AppError::Unauthorized;
        }

        AppError::Http {
            status: status.as_u16(),
            detail: error_detail(&body).unwrap_or_else(|| format!("Server error: {}", status)),
        }
    }
}

#[async_trait]
impl FeedSource for BackendClient {
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<FeedItem>, AppError> {
        self.fetch_feed(request).await
    }

    async fn fetch_item(&self, item_id: &str) -> Result<FeedItem, AppError> {
        self.get_video(item_id).await
    }
}

/// Profile as returned by `GET /user/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProfile {
    #[serde(default, alias = "userId", alias = "uid")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "photoUrl")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    email: String,
}

/// Extract the `detail` message from an error body, if there is one.
fn error_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_variants() {
        assert_eq!(
            error_detail(r#"{"detail":"Username already taken"}"#),
            Some("Username already taken".to_string())
        );
        assert_eq!(error_detail(r#"{"detail":null}"#), None);
        assert_eq!(error_detail("Internal Server Error"), None);
        assert!(error_detail(r#"{"detail":[{"loc":["body"]}]}"#).is_some());
    }
}
