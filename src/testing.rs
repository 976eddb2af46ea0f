//! Recording fakes for the conferencing SDK and the rooms backend.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::api::{
    CreateRoomRequest, CreateRoomResponse, DisableRoomRequest, DisableRoomResponse,
    JoinRoomRequest, JoinRoomResponse, RoomSummary, RoomsBackend,
};
use crate::peer::{Peer, PeerId, SdkRole};
use crate::sdk::{ChatSendResult, ConferenceSdk, JoinRequest, RoomSignal};

#[derive(Clone, Debug, PartialEq)]
pub enum SdkCall {
    AuthToken(String),
    Join(JoinRequest),
    Leave,
    ChangeRole(PeerId, SdkRole),
    ChangeMetadata(PeerId, String),
    SetLocalAudio(bool),
    Signal(RoomSignal),
    Chat(String),
}

/// Keeps its own peer model so every accepted mutation can be recorded as a
/// snapshot, the way a third party reading the store would observe it.
#[derive(Default)]
pub struct FakeSdk {
    pub calls: Vec<SdkCall>,
    pub peers: Vec<Peer>,
    pub snapshots: Vec<Vec<Peer>>,
    /// One-shot failures keyed by method name.
    pub failures: HashMap<&'static str, String>,
    pub chat_result: ChatSendResult,
    pub sent_chats: Vec<String>,
    pub signals: Vec<RoomSignal>,
    pub levels: HashMap<PeerId, f32>,
    pub room_id: Option<String>,
    pub joined: Option<JoinRequest>,
    pub local_audio_enabled: bool,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self {
            chat_result: ChatSendResult {
                success: true,
                ..ChatSendResult::default()
            },
            ..Self::default()
        }
    }

    pub fn seed_peers(&mut self, peers: Vec<Peer>) {
        self.peers = peers;
    }

    pub fn fail(&mut self, method: &'static str, err: &str) {
        self.failures.insert(method, err.to_string());
    }

    pub fn count(&self, matches: impl Fn(&SdkCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    fn check(&mut self, method: &'static str) -> Result<(), String> {
        match self.failures.remove(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn mutate_peer(&mut self, peer_id: &PeerId, apply: impl FnOnce(&mut Peer)) {
        if let Some(peer) = self.peers.iter_mut().find(|peer| &peer.id == peer_id) {
            apply(peer);
            self.snapshots.push(self.peers.clone());
        }
    }
}

impl ConferenceSdk for FakeSdk {
    fn auth_token_for_room_code(&mut self, code: &str) -> Result<String, String> {
        self.calls.push(SdkCall::AuthToken(code.to_string()));
        self.check("auth_token_for_room_code")?;
        Ok(format!("token-{code}"))
    }

    fn join(&mut self, request: &JoinRequest) -> Result<(), String> {
        self.calls.push(SdkCall::Join(request.clone()));
        self.check("join")?;
        self.joined = Some(request.clone());
        self.local_audio_enabled = !request.start_muted;
        Ok(())
    }

    fn leave(&mut self) -> Result<(), String> {
        self.calls.push(SdkCall::Leave);
        self.check("leave")?;
        self.joined = None;
        Ok(())
    }

    fn change_role_of_peer(&mut self, peer_id: &PeerId, role: SdkRole) -> Result<(), String> {
        self.calls.push(SdkCall::ChangeRole(peer_id.clone(), role));
        self.check("change_role_of_peer")?;
        self.mutate_peer(peer_id, |peer| peer.role = role);
        Ok(())
    }

    fn change_peer_metadata(&mut self, peer_id: &PeerId, metadata: &str) -> Result<(), String> {
        self.calls
            .push(SdkCall::ChangeMetadata(peer_id.clone(), metadata.to_string()));
        self.check("change_peer_metadata")?;
        self.mutate_peer(peer_id, |peer| peer.metadata = metadata.to_string());
        Ok(())
    }

    fn set_local_audio_enabled(&mut self, enabled: bool) -> Result<(), String> {
        self.calls.push(SdkCall::SetLocalAudio(enabled));
        self.check("set_local_audio_enabled")?;
        self.local_audio_enabled = enabled;
        Ok(())
    }

    fn send_signal(&mut self, signal: &RoomSignal) -> Result<(), String> {
        self.calls.push(SdkCall::Signal(signal.clone()));
        self.check("send_signal")?;
        self.signals.push(signal.clone());
        Ok(())
    }

    fn send_chat(&mut self, text: &str) -> ChatSendResult {
        self.calls.push(SdkCall::Chat(text.to_string()));
        if self.chat_result.success {
            self.sent_chats.push(text.to_string());
        }
        self.chat_result.clone()
    }

    fn audio_level(&self, peer_id: &PeerId) -> f32 {
        self.levels.get(peer_id).copied().unwrap_or(0.0)
    }

    fn associated_room_id(&self) -> Option<String> {
        self.room_id.clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    List,
    Create(u64, String),
    Join(String, u64),
    Disable(String, u64),
}

pub struct FakeBackend {
    pub calls: RefCell<Vec<BackendCall>>,
    pub rooms: Vec<RoomSummary>,
    pub create_result: Result<CreateRoomResponse, String>,
    pub join_result: Result<JoinRoomResponse, String>,
    pub disable_result: Result<DisableRoomResponse, String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            rooms: Vec::new(),
            create_result: Ok(CreateRoomResponse {
                code: "host-code".to_string(),
                room_id: "room-new".to_string(),
            }),
            join_result: Ok(JoinRoomResponse {
                code: "guest-code".to_string(),
                role: None,
                server_is_creator: None,
            }),
            disable_result: Ok(DisableRoomResponse {
                success: true,
                message: None,
            }),
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }
}

impl RoomsBackend for FakeBackend {
    fn list_rooms(&self) -> Result<Vec<RoomSummary>, String> {
        self.calls.borrow_mut().push(BackendCall::List);
        Ok(self.rooms.clone())
    }

    fn create_room(&self, request: &CreateRoomRequest) -> Result<CreateRoomResponse, String> {
        self.calls
            .borrow_mut()
            .push(BackendCall::Create(request.fid, request.address.clone()));
        self.create_result.clone()
    }

    fn join_room(&self, request: &JoinRoomRequest) -> Result<JoinRoomResponse, String> {
        self.calls
            .borrow_mut()
            .push(BackendCall::Join(request.room_id.clone(), request.fid));
        self.join_result.clone()
    }

    fn disable_room(&self, request: &DisableRoomRequest) -> Result<DisableRoomResponse, String> {
        self.calls
            .borrow_mut()
            .push(BackendCall::Disable(request.room_id.clone(), request.fid));
        self.disable_result.clone()
    }
}
