// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use triangle_feed::config::Config;
use triangle_feed::error::{auth_codes, AppError};
use triangle_feed::feed::{
    FeedSession, FeedSource, MemorySurface, PageLimits, PlayerConfig, PlayerFactory, PlayerWidget,
};
use triangle_feed::models::{FeedItem, FeedMode, FeedRequest, Locale};
use triangle_feed::services::{IdentityProvider, IdentityUser, SignInMethod};

/// `count` catalog items with IDs `v0`, `v1`, ...
#[allow(dead_code)]
pub fn catalog(count: usize, is_short: bool) -> Vec<FeedItem> {
    (0..count)
        .map(|i| {
            let mut item = FeedItem::new(format!("v{i}"), format!("Channel {i}"), format!("Video {i}"));
            item.is_short = is_short;
            item.likes = (i as u64) * 1_000;
            item
        })
        .collect()
}

/// Server-side paging over a catalog: filter, then skip/limit.
pub fn page_of(items: &[FeedItem], request: &FeedRequest) -> Vec<FeedItem> {
    items
        .iter()
        .filter(|item| request.is_short.map_or(true, |short| item.is_short == short))
        .skip(request.skip as usize)
        .take(request.limit as usize)
        .cloned()
        .collect()
}

// ─── In-process feed source ──────────────────────────────────

/// Feed source over a fixed catalog that records requests.
#[derive(Default)]
pub struct ScriptedSource {
    pub items: Vec<FeedItem>,
    pub requests: Mutex<Vec<FeedRequest>>,
    pub item_lookups: Mutex<Vec<String>>,
    pub fail_next: AtomicBool,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Make the next page request wait until the returned sender fires.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock().unwrap() = Some(rx);
        tx
    }

    pub fn requests(&self) -> Vec<FeedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<FeedItem>, AppError> {
        self.requests.lock().unwrap().push(request.clone());

        let hold = self.hold.lock().unwrap().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Http {
                status: 503,
                detail: "Service Unavailable".to_string(),
            });
        }

        Ok(page_of(&self.items, request))
    }

    async fn fetch_item(&self, item_id: &str) -> Result<FeedItem, AppError> {
        self.item_lookups.lock().unwrap().push(item_id.to_string());
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Video {item_id}")))
    }
}

// ─── Player widgets ──────────────────────────────────────────

/// Player library stand-in that records every command as `"<cmd>:<element>"`.
#[derive(Default, Clone)]
pub struct RecordingPlayers {
    pub log: Arc<Mutex<Vec<String>>>,
    pub created: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingPlayers {
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

struct RecordingWidget {
    element_id: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingWidget {
    fn record(&self, command: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{command}:{}", self.element_id));
    }
}

impl PlayerWidget for RecordingWidget {
    fn play_video(&mut self) {
        self.record("play");
    }
    fn pause_video(&mut self) {
        self.record("pause");
    }
    fn mute(&mut self) {
        self.record("mute");
    }
    fn un_mute(&mut self) {
        self.record("unmute");
    }
}

impl PlayerFactory for RecordingPlayers {
    fn create(&self, config: &PlayerConfig) -> Result<Box<dyn PlayerWidget>, AppError> {
        self.created.lock().unwrap().push(config.element_id.clone());
        Ok(Box::new(RecordingWidget {
            element_id: config.element_id.clone(),
            log: self.log.clone(),
        }))
    }
}

/// A session over `source` with a shared surface and recording players.
#[allow(dead_code)]
pub fn session(
    mode: FeedMode,
    limits: PageLimits,
    source: Arc<ScriptedSource>,
) -> (FeedSession, MemorySurface, RecordingPlayers) {
    let surface = MemorySurface::new();
    let players = RecordingPlayers::default();
    let session = FeedSession::new(
        mode,
        Locale::resolve(None),
        limits,
        source,
        Arc::new(players.clone()),
        Box::new(surface.clone()),
    );
    (session, surface, players)
}

// ─── Mock backend over HTTP ──────────────────────────────────

/// State behind the mock backend.
#[derive(Default)]
pub struct MockState {
    pub videos: Vec<FeedItem>,
    pub feed_requests: Mutex<Vec<FeedRequest>>,
    pub fail_feed: AtomicBool,
    /// Stored profiles keyed by bearer token
    pub profiles: Mutex<HashMap<String, Value>>,
    pub profile_server_error: AtomicBool,
    pub registrations: Mutex<Vec<Value>>,
    /// When set, registration fails with this detail
    pub reject_registration: Mutex<Option<String>>,
    /// username → email
    pub usernames: HashMap<String, String>,
}

/// A running mock backend.
pub struct MockBackend {
    pub state: Arc<MockState>,
    pub config: Config,
}

/// Spawn the mock backend on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_backend(state: MockState) -> MockBackend {
    let state = Arc::new(state);

    let app = Router::new()
        .route("/api/feed", post(feed))
        .route("/api/video/{id}", get(video))
        .route("/api/user/profile", get(get_profile).post(save_profile))
        .route("/api/user/register", post(register))
        .route("/api/user/lookup", post(lookup))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    let mut config = Config::test_default();
    config.api_base_url = format!("http://{addr}/api");

    MockBackend { state, config }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn feed(State(state): State<Arc<MockState>>, Json(request): Json<FeedRequest>) -> Response {
    state.feed_requests.lock().unwrap().push(request.clone());
    if state.fail_feed.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    Json(page_of(&state.videos, &request)).into_response()
}

async fn video(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    match state.videos.iter().find(|v| v.id == id) {
        Some(item) => Json(item.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Video not found in database"),
    }
}

async fn get_profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let Some(token) = bearer(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    };
    if state.profile_server_error.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    }
    match state.profiles.lock().unwrap().get(&token) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Profile not found"),
    }
}

async fn save_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(token) = bearer(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    };
    if state.profile_server_error.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save profile");
    }
    state.profiles.lock().unwrap().insert(token, body);
    Json(json!({ "status": "ok" })).into_response()
}

async fn register(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    if let Some(reason) = state.reject_registration.lock().unwrap().clone() {
        return detail(StatusCode::BAD_REQUEST, &reason);
    }
    state.registrations.lock().unwrap().push(body);
    Json(json!({ "status": "registered" })).into_response()
}

async fn lookup(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    match state.usernames.get(username) {
        Some(email) => Json(json!({ "email": email })).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

// ─── Identity provider ───────────────────────────────────────

/// In-memory identity provider.
#[derive(Default)]
pub struct FakeIdentity {
    /// email → (password, user)
    pub accounts: Mutex<HashMap<String, (String, IdentityUser)>>,
    pub current: Mutex<Option<IdentityUser>>,
    pub popup_user: Mutex<Option<IdentityUser>>,
    /// Popup never completes while set
    pub popup_hangs: AtomicBool,
    pub deleted: Mutex<Vec<String>>,
    pub verification_sent: AtomicBool,
}

#[allow(dead_code)]
impl FakeIdentity {
    pub fn user(uid: &str, email: &str, verified: bool) -> IdentityUser {
        IdentityUser {
            uid: uid.to_string(),
            email: Some(email.to_string()),
            email_verified: verified,
            display_name: None,
            photo_url: None,
            method: SignInMethod::Password,
        }
    }

    pub fn with_account(self, password: &str, user: IdentityUser) -> Self {
        let email = user.email.clone().unwrap_or_default();
        self.accounts
            .lock()
            .unwrap()
            .insert(email, (password.to_string(), user));
        self
    }

    pub fn signed_in(self, user: IdentityUser) -> Self {
        *self.current.lock().unwrap() = Some(user);
        self
    }

    /// Bearer token the fake hands out for a user.
    pub fn token_for(uid: &str) -> String {
        format!("token-{uid}")
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_user(&self) -> Option<IdentityUser> {
        self.current.lock().unwrap().clone()
    }

    async fn id_token(&self, _force_refresh: bool) -> Result<String, AppError> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|u| Self::token_for(&u.uid))
            .ok_or(AppError::Unauthorized)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError> {
        let accounts = self.accounts.lock().unwrap();
        let Some((expected, user)) = accounts.get(email) else {
            return Err(AppError::identity(auth_codes::USER_NOT_FOUND, "no such user"));
        };
        if expected != password {
            return Err(AppError::identity(
                auth_codes::INVALID_CREDENTIAL,
                "wrong password",
            ));
        }
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(user.clone())
    }

    async fn sign_in_with_popup(&self) -> Result<IdentityUser, AppError> {
        if self.popup_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let user = self.popup_user.lock().unwrap().clone().ok_or_else(|| {
            AppError::identity(auth_codes::POPUP_CLOSED_BY_USER, "popup closed")
        })?;
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityUser, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AppError::identity(
                auth_codes::EMAIL_ALREADY_IN_USE,
                "email in use",
            ));
        }
        let user = Self::user(&format!("uid-{}", accounts.len() + 1), email, false);
        accounts.insert(email.to_string(), (password.to_string(), user.clone()));
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn update_display_name(&self, name: &str) -> Result<(), AppError> {
        if let Some(user) = self.current.lock().unwrap().as_mut() {
            user.display_name = Some(name.to_string());
        }
        Ok(())
    }

    async fn send_email_verification(&self) -> Result<(), AppError> {
        self.verification_sent.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_current_user(&self) -> Result<(), AppError> {
        let user = self.current.lock().unwrap().take().ok_or(AppError::Unauthorized)?;
        if let Some(email) = &user.email {
            self.accounts.lock().unwrap().remove(email);
        }
        self.deleted.lock().unwrap().push(user.uid);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}
