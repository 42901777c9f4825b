//! Signed-in user and their favorite countries.
//!
//! A [`Session`] exists only while someone is signed in; signing out
//! consumes it. Favorites are persisted through a [`FavoritesStore`] before
//! the in-memory list changes, so the two never disagree.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{Error, Result};

pub const FAVORITES_ERROR: &str = "Failed to update favorites. Please try again.";

/// Per-user document, stored as `{"favorites": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub favorites: Vec<String>,
}

pub trait FavoritesStore {
    fn load(&self, user: &str) -> Result<Option<UserDocument>>;
    fn save(&self, user: &str, document: &UserDocument) -> Result<()>;
}

/// One JSON file per user under `<root>/users/`.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, user: &str) -> PathBuf {
        self.root.join("users").join(format!("{}.json", file_stem(user)))
    }
}

impl FavoritesStore for JsonFileStore {
    fn load(&self, user: &str) -> Result<Option<UserDocument>> {
        let path = self.path_for(user);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| Error::Store(format!("{}: {}", path.display(), err)))
    }

    fn save(&self, user: &str, document: &UserDocument) -> Result<()> {
        let path = self.path_for(user);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(document)
            .map_err(|err| Error::Store(err.to_string()))?;
        write_atomically(&path, &raw)
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Percent-encodes every byte outside `[A-Za-z0-9_-]`, so distinct user
/// names always get distinct files.
fn file_stem(user: &str) -> String {
    let mut stem = String::with_capacity(user.len());
    for byte in user.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

fn validate_user(user: &str) -> Result<&str> {
    let trimmed = user.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUser(user.to_string()));
    }
    Ok(trimmed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: String,
    favorites: Vec<String>,
    last_error: Option<String>,
}

impl Session {
    /// Signs `user` in, creating an empty document the first time.
    pub fn sign_in(user: &str, store: &dyn FavoritesStore) -> Result<Self> {
        let user = validate_user(user)?;
        let document = match store.load(user)? {
            Some(document) => document,
            None => {
                info!(user, "creating favorites document");
                let document = UserDocument::default();
                store.save(user, &document)?;
                document
            }
        };
        info!(user, favorites = document.favorites.len(), "signed in");
        Ok(Self {
            user: user.to_string(),
            favorites: document.favorites,
            last_error: None,
        })
    }

    /// Creates a new account. Fails if the user already has a document.
    pub fn register(user: &str, store: &dyn FavoritesStore) -> Result<Self> {
        let user = validate_user(user)?;
        if store.load(user)?.is_some() {
            return Err(Error::UserExists(user.to_string()));
        }
        store.save(user, &UserDocument::default())?;
        info!(user, "registered");
        Ok(Self {
            user: user.to_string(),
            favorites: Vec::new(),
            last_error: None,
        })
    }

    pub fn sign_out(self) {
        info!(user = %self.user, "signed out");
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.favorites.iter().any(|favorite| favorite == code)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn add_favorite(&mut self, code: &str, store: &dyn FavoritesStore) {
        if self.is_favorite(code) {
            return;
        }
        let mut next = self.favorites.clone();
        next.push(code.to_string());
        self.commit(next, store);
    }

    pub fn remove_favorite(&mut self, code: &str, store: &dyn FavoritesStore) {
        if !self.is_favorite(code) {
            return;
        }
        let next = self
            .favorites
            .iter()
            .filter(|favorite| *favorite != code)
            .cloned()
            .collect();
        self.commit(next, store);
    }

    pub fn toggle_favorite(&mut self, code: &str, store: &dyn FavoritesStore) {
        if self.is_favorite(code) {
            self.remove_favorite(code, store);
        } else {
            self.add_favorite(code, store);
        }
    }

    fn commit(&mut self, favorites: Vec<String>, store: &dyn FavoritesStore) {
        let document = UserDocument { favorites };
        match store.save(&self.user, &document) {
            Ok(()) => {
                self.favorites = document.favorites;
                self.last_error = None;
            }
            Err(err) => {
                error!(user = %self.user, error = %err, "failed to save favorites");
                self.last_error = Some(FAVORITES_ERROR.to_string());
            }
        }
    }
}
