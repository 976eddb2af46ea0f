//! Room lifecycle controller: join/create, the peer feed, polled timers and
//! every user action that has to be routed through the live session.

mod actions;
mod leave;
mod session;
mod speaking;


use std::time::{Duration, Instant};

use crate::api::{CreateRoomRequest, JoinRoomRequest, RoomsBackend};
use crate::events::{EventBus, RoomEvent};
use crate::interaction::reactions::ReactionEngine;
use crate::peer::{Peer, PeerId, PeerMetadata, PeerProfile, SdkRole};
use crate::persistence::SessionStore;
use crate::projection;
use crate::sdk::{ConferenceSdk, JoinRequest};
use crate::shared::text::{format_duration, short_room_id};
use crate::store::PeerStore;

pub use leave::{LeaveChoice, LeaveFlow, LeaveOutcome};
pub use session::{ModerationSheet, RoomSession};
pub use speaking::{SpeakingDetector, SPEAKING_POLL_INTERVAL, SPEAKING_THRESHOLD};

use session::{SessionTimer, MAX_CREATOR_REPAIRS};

const DURATION_TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Who the local user is, as reported by the identity provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalIdentity {
    pub fid: Option<u64>,
    pub address: Option<String>,
    pub profile: Option<PeerProfile>,
}

impl LocalIdentity {
    pub(crate) fn require(&self) -> Result<(u64, String), String> {
        match (self.fid, self.address.as_deref()) {
            (Some(fid), Some(address)) if !address.trim().is_empty() => {
                Ok((fid, address.to_string()))
            }
            (None, _) => Err("Sign in with Farcaster to continue.".to_string()),
            _ => Err("Connect a wallet to continue.".to_string()),
        }
    }

    fn metadata(&self, is_creator: bool) -> PeerMetadata {
        PeerMetadata {
            fid: self.fid,
            is_creator,
            is_cohost: false,
            address: self.address.clone(),
            profile: self.profile.clone(),
        }
    }
}

pub struct RoomController<S, B> {
    sdk: S,
    backend: B,
    store: PeerStore,
    events: EventBus,
    durable: SessionStore,
    identity: LocalIdentity,
    state: ConnectionState,
    pending_room_id: Option<String>,
    room_hint: Option<String>,
    session: Option<RoomSession>,
    reaction_seed: Option<u64>,
}

impl<S: ConferenceSdk, B: RoomsBackend> RoomController<S, B> {
    pub fn new(sdk: S, backend: B, durable: SessionStore, identity: LocalIdentity) -> Self {
        Self {
            sdk,
            backend,
            store: PeerStore::new(),
            events: EventBus::new(),
            durable,
            identity,
            state: ConnectionState::Disconnected,
            pending_room_id: None,
            room_hint: None,
            session: None,
            reaction_seed: None,
        }
    }

    /// Deterministic particle layout, for tests and recordings.
    pub fn with_reaction_seed(mut self, seed: u64) -> Self {
        self.reaction_seed = Some(seed);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn store(&self) -> &PeerStore {
        &self.store
    }

    pub fn session(&self) -> Option<&RoomSession> {
        self.session.as_ref()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.session.as_ref().and_then(RoomSession::room_id)
    }

    pub fn is_creator(&self) -> bool {
        self.session.as_ref().is_some_and(RoomSession::is_creator)
    }

    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: LocalIdentity) {
        self.identity = identity;
    }

    /// Room id supplied by the UI (deep link, lobby row) used as a last
    /// resort when connecting.
    pub fn set_room_hint(&mut self, room_id: Option<String>) {
        self.room_hint = room_id.filter(|id| !id.trim().is_empty());
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn sdk_mut(&mut self) -> &mut S {
        &mut self.sdk
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn durable(&self) -> &SessionStore {
        &self.durable
    }

    // -- connect ------------------------------------------------------------

    pub fn join_room(&mut self, room_id: &str, now: Instant) -> Result<(), String> {
        if self.state != ConnectionState::Disconnected {
            return Err("Already in a room.".to_string());
        }
        let (fid, address) = self.identity.require()?;
        self.set_state(ConnectionState::Connecting);
        self.events.publish_progress(
            "rooms.join",
            format!("Joining room {}...", short_room_id(room_id)),
        );

        let joined = match self.backend.join_room(&JoinRoomRequest {
            room_id: room_id.to_string(),
            fid,
            address,
        }) {
            Ok(joined) => joined,
            Err(err) => return Err(self.fail_connect("rooms.join", err)),
        };

        let server_is_creator = joined.server_is_creator;
        let role = match joined.role.as_deref() {
            Some(name) => SdkRole::from_role_name(name),
            None if server_is_creator == Some(true) => SdkRole::Streamer,
            None => SdkRole::Viewer,
        };
        log::info!(
            "[Rooms] join accepted: room={}, role={}, server_is_creator={:?}",
            room_id,
            role.as_str(),
            server_is_creator
        );
        let metadata = self.identity.metadata(server_is_creator == Some(true));
        self.connect(
            "rooms.join",
            &joined.code,
            room_id,
            role,
            metadata,
            server_is_creator,
            now,
        )
    }

    /// Creates a room on the backend and joins it as its creator.
    pub fn create_room(&mut self, now: Instant) -> Result<String, String> {
        if self.state != ConnectionState::Disconnected {
            return Err("Already in a room.".to_string());
        }
        let (fid, address) = self.identity.require()?;
        self.set_state(ConnectionState::Connecting);
        self.events
            .publish_progress("rooms.create", "Creating room...");

        let created = match self
            .backend
            .create_room(&CreateRoomRequest { address, fid })
        {
            Ok(created) => created,
            Err(err) => return Err(self.fail_connect("rooms.create", err)),
        };
        log::info!("[Rooms] created room {}", created.room_id);

        let metadata = self.identity.metadata(true);
        self.connect(
            "rooms.create",
            &created.code,
            &created.room_id,
            SdkRole::Streamer,
            metadata,
            Some(true),
            now,
        )?;
        Ok(created.room_id)
    }

    fn connect(
        &mut self,
        key: &str,
        code: &str,
        room_id: &str,
        role: SdkRole,
        metadata: PeerMetadata,
        server_is_creator: Option<bool>,
        now: Instant,
    ) -> Result<(), String> {
        self.pending_room_id = Some(room_id.to_string());

        let token = match self.sdk.auth_token_for_room_code(code) {
            Ok(token) => token,
            Err(err) => {
                self.pending_room_id = None;
                return Err(self.fail_connect(key, format!("auth token: {err}")));
            }
        };
        let request = JoinRequest {
            auth_token: token,
            role,
            start_muted: true,
            metadata: metadata.encode(),
        };
        if let Err(err) = self.sdk.join(&request) {
            self.pending_room_id = None;
            return Err(self.fail_connect(key, err));
        }

        if let Err(err) = self.durable.save_room_id(room_id) {
            log::warn!("[Session] failed persisting room id: {err}");
        }
        self.on_connected(server_is_creator, request.start_muted, now);
        Ok(())
    }

    fn fail_connect(&mut self, key: &str, err: String) -> String {
        log::error!("[Rooms] connect failed: {err}");
        self.set_state(ConnectionState::Disconnected);
        self.events.publish_error(key, format!("Could not join: {err}"));
        err
    }

    /// Builds the session. Room id resolution prefers the in-flight value,
    /// then the SDK's own association, then the UI hint, then disk.
    pub fn on_connected(&mut self, server_is_creator: Option<bool>, start_muted: bool, now: Instant) {
        if let Some(mut previous) = self.session.take() {
            previous.drain(&mut self.store);
        }

        let room_id = self
            .pending_room_id
            .take()
            .or_else(|| self.sdk.associated_room_id())
            .or_else(|| self.room_hint.clone())
            .or_else(|| self.durable.load_room_id());
        if room_id.is_none() {
            log::warn!("[Rooms] connected without a resolvable room id");
        }

        let reactions = match self.reaction_seed {
            Some(seed) => ReactionEngine::with_seed(seed),
            None => ReactionEngine::new(),
        };
        let mut session = RoomSession::new(room_id, server_is_creator, start_muted, reactions);
        session.attach(&mut self.store);
        session
            .timers
            .schedule(now + SPEAKING_POLL_INTERVAL, SessionTimer::SpeakingPoll);
        self.session = Some(session);

        self.set_state(ConnectionState::Connected);
        if let Some(room_id) = self.room_id() {
            let message = format!("Joined room {}.", short_room_id(room_id));
            self.events.publish_success("rooms.join", message);
        }
        self.pump(now);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        log::info!("[Rooms] connection {:?} -> {:?}", self.state, state);
        self.state = state;
        self.events.emit(RoomEvent::ConnectionStateChanged { state });
    }

    // -- peer feed ------------------------------------------------------------

    pub fn apply_peers(&mut self, peers: Vec<Peer>, now: Instant) {
        self.store.replace_all(peers);
        self.pump(now);
    }

    pub fn upsert_peer(&mut self, peer: Peer, now: Instant) {
        self.store.upsert(peer);
        self.pump(now);
    }

    pub fn remove_peer(&mut self, peer_id: &PeerId, now: Instant) {
        self.store.remove(peer_id);
        self.pump(now);
    }

    /// Drains whatever the store observers captured and rebuilds the
    /// projection from it.
    fn pump(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.speaker_seen.get() && session.started_at.is_none() {
            session.started_at = Some(now);
            session
                .timers
                .schedule(now + DURATION_TICK, SessionTimer::DurationTick);
            log::info!("[Rooms] first speaker observed, duration timer started");
        }

        let Some(peers) = session.inbox.borrow_mut().take() else {
            return;
        };
        self.reconcile_creator(&peers);
        self.refresh_projection(peers);
    }

    fn reconcile_creator(&mut self, peers: &[Peer]) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.creator_fid.is_none() {
            session.creator_fid = peers
                .iter()
                .map(Peer::decoded_metadata)
                .find(|meta| meta.is_creator)
                .and_then(|meta| meta.fid);
            if let Some(fid) = session.creator_fid {
                log::info!("[Rooms] creator fid discovered: {fid}");
            }
        }

        let Some(local) = peers.iter().find(|peer| peer.is_local) else {
            return;
        };
        let metadata = local.decoded_metadata();
        if metadata.is_creator {
            session.was_creator = true;
            return;
        }

        // A rejoining creator gets fresh non-creator metadata when the backend
        // omits serverIsCreator. The creator flag left on the room by an earlier
        // connection still names us.
        let owns_room = session.server_is_creator.is_none()
            && self.identity.fid.is_some()
            && session.creator_fid == self.identity.fid;
        if owns_room {
            if !session.was_creator {
                log::info!("[Rooms] recognised as room creator by fid {:?}", self.identity.fid);
            }
            session.was_creator = true;
            return;
        }
        if !session.was_creator {
            return;
        }

        // Local belief says creator, metadata says otherwise.
        if session.server_is_creator != Some(true) {
            log::warn!(
                "[Rooms] local creator flag not backed by the server, deferring to metadata for {}",
                local.id
            );
            session.was_creator = false;
            return;
        }
        if session.creator_repairs >= MAX_CREATOR_REPAIRS {
            log::warn!(
                "[Rooms] creator metadata still missing after {} repairs",
                session.creator_repairs
            );
            return;
        }
        session.creator_repairs += 1;
        log::warn!(
            "[Rooms] creator flag missing from local metadata, rewriting (attempt {})",
            session.creator_repairs
        );
        let repaired = metadata.with_creator(true).encode();
        if let Err(err) = self.sdk.change_peer_metadata(&local.id, &repaired) {
            log::warn!("[Rooms] creator metadata repair failed: {err}");
        }
    }

    fn refresh_projection(&mut self, peers: Vec<Peer>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        // Hands of departed or promoted peers go away without the expiry path.
        for peer_id in session.hands.raised_set() {
            let still_listening = peers
                .iter()
                .any(|peer| peer.id == peer_id && !projection::is_speaker(peer));
            if !still_listening {
                if let Some(change) = session.hands.forget(&peer_id) {
                    if change.control_released {
                        self.events
                            .emit(RoomEvent::HandRaiseControl { enabled: true });
                    }
                }
            }
        }

        let departed: Vec<PeerId> = session
            .projection
            .speakers
            .iter()
            .chain(session.projection.listeners.iter())
            .map(|peer| peer.id.clone())
            .filter(|id| !peers.iter().any(|peer| &peer.id == id))
            .collect();
        for peer_id in &departed {
            session.reactions.purge(peer_id, &mut self.events);
        }

        if let Some(sheet) = &session.sheet {
            if !peers.iter().any(|peer| peer.id == sheet.target) {
                log::debug!("[Moderation] target {} left, closing sheet", sheet.target);
                session.sheet = None;
            }
        }

        session.projection = projection::project(&peers, &session.hands.raised_set());
        self.events.emit(RoomEvent::PeersChanged {
            speakers: session.projection.speakers.clone(),
            listeners: session.projection.listeners.clone(),
        });
    }

    // -- timers ---------------------------------------------------------------

    pub fn tick(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        for (_, timer) in session.timers.take_due(now) {
            match timer {
                SessionTimer::DurationTick => {
                    let seconds = session
                        .started_at
                        .map(|started| now.saturating_duration_since(started).as_secs())
                        .unwrap_or(0);
                    self.events.emit(RoomEvent::DurationTick {
                        seconds,
                        label: format_duration(seconds),
                    });
                    session
                        .timers
                        .schedule(now + DURATION_TICK, SessionTimer::DurationTick);
                }
                SessionTimer::SpeakingPoll => {
                    let sdk = &self.sdk;
                    if let Some(active) = session
                        .speaking
                        .poll(&session.projection.speakers, |id| sdk.audio_level(id))
                    {
                        self.events
                            .emit(RoomEvent::ActiveSpeakerChanged { peer_id: active });
                    }
                    session
                        .timers
                        .schedule(now + SPEAKING_POLL_INTERVAL, SessionTimer::SpeakingPoll);
                }
            }
        }

        let expired = session.hands.tick(now);
        let local_lowered = expired.iter().any(|change| change.control_released);
        for change in expired {
            let listener_order = session
                .projection
                .reorder_listeners(&session.hands.raised_set());
            self.events.emit(RoomEvent::HandRaiseChanged {
                peer_id: change.peer_id,
                raised: false,
                listener_order,
            });
        }
        if local_lowered {
            self.events
                .emit(RoomEvent::HandRaiseControl { enabled: true });
            let lower = crate::sdk::RoomSignal::HandRaise { raised: false };
            if let Err(err) = self.sdk.send_signal(&lower) {
                log::warn!("[Rooms] hand lower signal failed: {err}");
            }
        }

        session.reactions.tick(now, &mut self.events);
    }

    pub fn local_peer_id(&self) -> Option<PeerId> {
        self.store.local_peer().map(|peer| peer.id.clone())
    }
}
