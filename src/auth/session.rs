use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// Token and profile committed together by a successful login or refresh.
///
/// Bundling both into one value is what makes the commit atomic: an
/// observer of [`Session`] can never see the token without the profile
/// or the other way around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: UserProfile,
    pub created_at: DateTime<Utc>,
}

/// Persisted form of the session. Only the token is written to disk;
/// the profile is refetched by refresh on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    saved_at: DateTime<Utc>,
}

/// The one in-memory session of the running process.
///
/// Empty at startup. Populated only by a successful login or refresh,
/// cleared only by a successful logout; the session manager is the sole
/// writer.
pub struct Session {
    cache_dir: PathBuf,
    restored: Option<StoredSession>,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            restored: None,
            data: None,
        }
    }

    /// Load the persisted token from disk. Returns whether one was found.
    /// The session itself stays empty until refresh validates the token.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let stored: StoredSession =
                serde_json::from_str(&contents).context("Failed to parse session file")?;
            self.restored = Some(stored);
            return Ok(true);
        }
        Ok(false)
    }

    /// Persist the current token to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let stored = StoredSession {
                token: data.token.clone(),
                saved_at: Utc::now(),
            };
            let contents = serde_json::to_string_pretty(&stored)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear the session and remove the persisted token. The in-memory
    /// state is cleared even if the file removal fails.
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        self.restored = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Commit a new token/profile pair as one value.
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// The token to authenticate with: the live session's, or the one
    /// restored from disk when no login has happened this run.
    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.token.as_str())
            .or_else(|| self.restored.as_ref().map(|s| s.token.as_str()))
    }

    /// The current profile, present only while the session is live.
    pub fn user(&self) -> Option<&UserProfile> {
        self.data.as_ref().map(|d| &d.user)
    }

    /// Whether a login or refresh has populated the session this run.
    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }

    /// When the persisted token was written, if one was restored.
    pub fn restored_at(&self) -> Option<DateTime<Utc>> {
        self.restored.as_ref().map(|s| s.saved_at)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
