//! Durable fallback for the current room id. The SDK does not expose the room
//! association uniformly after join, so the last known id is kept on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub room_id: String,
    pub saved_at: i64, // unix millis
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Self {
        Self::new(crate::shared::config::rooms_data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn save_room_id(&self, room_id: &str) -> Result<(), String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| format!("Failed to create dir: {e}"))?;

        let session = PersistedSession {
            room_id: room_id.to_string(),
            saved_at: chrono::Utc::now().timestamp_millis(),
        };
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        let path = self.path();
        std::fs::write(&path, json).map_err(|e| format!("Failed to write: {e}"))?;

        log::debug!("[Session] Saved room id to {:?}", path);
        Ok(())
    }

    pub fn load(&self) -> Option<PersistedSession> {
        let path = self.path();
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(parsed) if !parsed.room_id.trim().is_empty() => Some(parsed),
            Ok(_) => None,
            Err(err) => {
                log::warn!("[Session] Ignoring unreadable session file {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn load_room_id(&self) -> Option<String> {
        self.load().map(|session| session.room_id)
    }

    pub fn clear(&self) {
        let path = self.path();
        if !path.exists() {
            return;
        }
        match std::fs::remove_file(&path) {
            Ok(_) => log::info!("[Session] Removed persisted session file: {:?}", path),
            Err(e) => log::warn!("[Session] Failed to remove session file {:?}: {}", path, e),
        }
    }
}
