//! Participant handles mirrored from the conferencing SDK's peer store.

use serde::{Deserialize, Serialize};

mod metadata;

pub use metadata::{PeerMetadata, PeerProfile};


/// Session-scoped SDK peer identifier. Not stable across rejoin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transport-level publish capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdkRole {
    Streamer,
    Viewer,
}

impl SdkRole {
    /// Unknown role names are treated as subscribe-only.
    pub fn from_role_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "streamer" | "host" | "speaker" => SdkRole::Streamer,
            _ => SdkRole::Viewer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SdkRole::Streamer => "streamer",
            SdkRole::Viewer => "viewer",
        }
    }

    pub fn can_publish(self) -> bool {
        self == SdkRole::Streamer
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Peer {
    pub id: PeerId,
    pub role: SdkRole,
    /// Raw metadata string exactly as the SDK stores it.
    pub metadata: String,
    pub audio_enabled: bool,
    pub is_local: bool,
    pub joined_at: Option<i64>, // unix millis
}

impl Peer {
    pub fn new(id: impl Into<String>, role: SdkRole) -> Self {
        Self {
            id: PeerId::new(id),
            role,
            metadata: String::new(),
            audio_enabled: false,
            is_local: false,
            joined_at: None,
        }
    }

    pub fn with_metadata(mut self, metadata: &PeerMetadata) -> Self {
        self.metadata = metadata.encode();
        self
    }

    pub fn with_raw_metadata(mut self, raw: impl Into<String>) -> Self {
        self.metadata = raw.into();
        self
    }

    pub fn local(mut self) -> Self {
        self.is_local = true;
        self
    }

    pub fn decoded_metadata(&self) -> PeerMetadata {
        PeerMetadata::decode(&self.metadata)
    }

    pub fn display_name(&self) -> String {
        let meta = self.decoded_metadata();
        meta.profile
            .as_ref()
            .and_then(|p| {
                p.display_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .or_else(|| Some(p.username.clone()))
            })
            .filter(|name| !name.trim().is_empty())
            .or_else(|| meta.fid.map(|fid| format!("fid:{fid}")))
            .unwrap_or_else(|| self.id.to_string())
    }
}
