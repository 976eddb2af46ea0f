use crate::shared::text::short_room_id;

use super::models::{
    CreateRoomRequest, CreateRoomResponse, DisableRoomRequest, DisableRoomResponse,
    JoinRoomRequest, JoinRoomResponse, ListRoomsBody, RoomSummary,
};
use super::util::{join_url, read_response, READ_TIMEOUT, WRITE_TIMEOUT};
use super::RoomsBackend;

#[derive(Clone, Debug)]
pub struct HttpRoomsBackend {
    base_url: String,
}

impl HttpRoomsBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
        body: &B,
    ) -> Result<T, String> {
        let url = join_url(&self.base_url, path);
        let response = ureq::post(&url)
            .config()
            .http_status_as_error(false)
            .timeout_global(Some(WRITE_TIMEOUT))
            .build()
            .header("content-type", "application/json")
            .send_json(body)
            .map_err(|e| format!("{action} request failed: {e}"))?;
        read_response(response, action, &url)
    }
}

impl RoomsBackend for HttpRoomsBackend {
    fn list_rooms(&self) -> Result<Vec<RoomSummary>, String> {
        let url = join_url(&self.base_url, "/rooms");
        let response = ureq::get(&url)
            .config()
            .http_status_as_error(false)
            .timeout_global(Some(READ_TIMEOUT))
            .build()
            .call()
            .map_err(|e| format!("list rooms request failed: {e}"))?;

        let body: ListRoomsBody = read_response(response, "list rooms", &url)?;
        let rooms = body.into_rooms();
        log::debug!("[Rooms] listed {} rooms from {}", rooms.len(), url);
        Ok(rooms)
    }

    fn create_room(&self, request: &CreateRoomRequest) -> Result<CreateRoomResponse, String> {
        log::info!("[Rooms] Creating room: fid={}", request.fid);
        let parsed: CreateRoomResponse = self.post_json("/create-room", "create room", request)?;
        log::info!(
            "[Rooms] Room created: room_id={}",
            short_room_id(&parsed.room_id)
        );
        Ok(parsed)
    }

    fn join_room(&self, request: &JoinRoomRequest) -> Result<JoinRoomResponse, String> {
        log::info!(
            "[Rooms] Joining room: room_id={}, fid={}",
            short_room_id(&request.room_id),
            request.fid
        );
        self.post_json("/join-room", "join room", request)
    }

    fn disable_room(&self, request: &DisableRoomRequest) -> Result<DisableRoomResponse, String> {
        log::info!(
            "[Rooms] Disabling room: room_id={}, fid={}",
            short_room_id(&request.room_id),
            request.fid
        );
        let parsed: DisableRoomResponse =
            self.post_json("/disable-room", "disable room", request)?;
        if !parsed.success {
            return Err(parsed
                .message
                .unwrap_or_else(|| "disable room was rejected".to_string()));
        }
        Ok(parsed)
    }
}
