//! Blocking REST clients for the rooms backend and the profile service.

mod models;
mod profiles;
mod rooms;
mod util;

pub use models::{
    CreateRoomRequest, CreateRoomResponse, DisableRoomRequest, DisableRoomResponse,
    JoinRoomRequest, JoinRoomResponse, RoomSummary,
};
pub use profiles::NeynarProfileClient;
pub use rooms::HttpRoomsBackend;

/// Room lifecycle endpoints. The controller only talks to this trait so the
/// end-room and join flows can run against a fake.
pub trait RoomsBackend {
    fn list_rooms(&self) -> Result<Vec<RoomSummary>, String>;
    fn create_room(&self, request: &CreateRoomRequest) -> Result<CreateRoomResponse, String>;
    fn join_room(&self, request: &JoinRoomRequest) -> Result<JoinRoomResponse, String>;
    fn disable_room(&self, request: &DisableRoomRequest) -> Result<DisableRoomResponse, String>;
}
