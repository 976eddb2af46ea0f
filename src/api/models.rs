use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[serde(alias = "id")]
    pub room_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator_fid: Option<u64>,
    #[serde(default)]
    pub creator_address: Option<String>,
    #[serde(default, alias = "participants")]
    pub participant_count: u32,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RoomSummary {
    pub fn is_live(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// `GET /rooms` answers either `{ "rooms": [...] }` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum ListRoomsBody {
    Wrapped { rooms: Vec<RoomSummary> },
    Bare(Vec<RoomSummary>),
}

impl ListRoomsBody {
    pub(super) fn into_rooms(self) -> Vec<RoomSummary> {
        match self {
            ListRoomsBody::Wrapped { rooms } | ListRoomsBody::Bare(rooms) => rooms,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub address: String,
    pub fid: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub code: String,
    pub room_id: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub fid: u64,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub code: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "isCreator", alias = "serverIsCreator")]
    pub server_is_creator: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableRoomRequest {
    pub room_id: String,
    pub address: String,
    pub fid: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableRoomResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}
