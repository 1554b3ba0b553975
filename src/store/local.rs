// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key/value store backed by a JSON object on disk.
//!
//! Semantics follow browser local storage: string values, last write wins,
//! no schema versioning. Every write rewrites the whole file.

use crate::error::AppError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Client-local key/value store.
#[derive(Clone)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: Arc<Mutex<Map<String, Value>>>,
}

impl LocalStore {
    /// Open (or lazily create) a store file.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and treated as empty; it is replaced on the next write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Discarding corrupt store file"
                    );
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened local store");

        Ok(Self {
            path: Some(path),
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    /// Create a store that is never persisted (tests, anonymous runs).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::new(Mutex::new(Map::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).and_then(|v| v.as_str()).map(str::to_string)
    }

    /// Write a value, replacing any previous one.
    pub fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.flush(&entries)
    }

    /// Remove a value. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn flush(&self, entries: &Map<String, Value>) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Storage(e.to_string()))?;
        fs::write(path, raw)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))
    }
}
