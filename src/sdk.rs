//! Boundary to the external real-time conferencing SDK.
//!
//! Calls are blocking request/response pairs; a caller that needs ordering
//! (clear cohost metadata, then change role) simply sequences them.

use serde::{Deserialize, Serialize};

use crate::peer::{PeerId, SdkRole};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinRequest {
    pub auth_token: String,
    pub role: SdkRole,
    pub start_muted: bool,
    pub metadata: String,
}

/// Ephemeral signals carried on the SDK's data channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomSignal {
    HandRaise { raised: bool },
    Reaction { emoji: String },
}

/// Result shape of the SDK's chat send call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSendResult {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Server timestamp of the accepted message, unix millis.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl ChatSendResult {
    pub fn is_rate_limited(&self) -> bool {
        self.error.as_deref() == Some("rate_limited")
    }
}

pub trait ConferenceSdk {
    fn auth_token_for_room_code(&mut self, code: &str) -> Result<String, String>;
    fn join(&mut self, request: &JoinRequest) -> Result<(), String>;
    fn leave(&mut self) -> Result<(), String>;
    fn change_role_of_peer(&mut self, peer_id: &PeerId, role: SdkRole) -> Result<(), String>;
    fn change_peer_metadata(&mut self, peer_id: &PeerId, metadata: &str) -> Result<(), String>;
    fn set_local_audio_enabled(&mut self, enabled: bool) -> Result<(), String>;
    fn send_signal(&mut self, signal: &RoomSignal) -> Result<(), String>;
    fn send_chat(&mut self, text: &str) -> ChatSendResult;
    /// Normalised 0.0..=1.0 input level for a peer; 0.0 when unknown.
    fn audio_level(&self, peer_id: &PeerId) -> f32;
    /// Room the SDK believes it is associated with, when it exposes one.
    fn associated_room_id(&self) -> Option<String>;
}
