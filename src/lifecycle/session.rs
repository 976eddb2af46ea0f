//! State owned by one join-to-leave span. Built on connect, drained on
//! disconnect; nothing here survives into the next session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::interaction::chat::ChatEngine;
use crate::interaction::hand_raise::HandRaises;
use crate::interaction::reactions::ReactionEngine;
use crate::peer::{Peer, PeerId};
use crate::projection::{self, PeerProjection};
use crate::store::{PeerStore, SubscriptionId};
use crate::timers::TimerRegistry;

use super::speaking::SpeakingDetector;

/// Repair attempts for the local creator flag before giving up.
pub(super) const MAX_CREATOR_REPAIRS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SessionTimer {
    DurationTick,
    SpeakingPoll,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModerationSheet {
    pub target: PeerId,
}

pub struct RoomSession {
    pub(super) room_id: Option<String>,
    pub(super) started_at: Option<Instant>,
    pub(super) creator_fid: Option<u64>,
    pub(super) was_creator: bool,
    pub(super) server_is_creator: Option<bool>,
    pub(super) creator_repairs: u32,
    pub(super) projection: PeerProjection,
    pub(super) hands: HandRaises,
    pub(super) reactions: ReactionEngine,
    pub(super) chat: ChatEngine,
    pub(super) speaking: SpeakingDetector,
    pub(super) timers: TimerRegistry<SessionTimer>,
    pub(super) subscriptions: Vec<SubscriptionId>,
    pub(super) inbox: Rc<RefCell<Option<Vec<Peer>>>>,
    pub(super) speaker_seen: Rc<Cell<bool>>,
    pub(super) sheet: Option<ModerationSheet>,
    pub(super) is_muted: bool,
}

impl RoomSession {
    pub(super) fn new(
        room_id: Option<String>,
        server_is_creator: Option<bool>,
        start_muted: bool,
        reactions: ReactionEngine,
    ) -> Self {
        Self {
            room_id,
            started_at: None,
            creator_fid: None,
            was_creator: server_is_creator == Some(true),
            server_is_creator,
            creator_repairs: 0,
            projection: PeerProjection::default(),
            hands: HandRaises::new(),
            reactions,
            chat: ChatEngine::new(),
            speaking: SpeakingDetector::new(),
            timers: TimerRegistry::new(),
            subscriptions: Vec::new(),
            inbox: Rc::new(RefCell::new(None)),
            speaker_seen: Rc::new(Cell::new(false)),
            sheet: None,
            is_muted: start_muted,
        }
    }

    /// Registers the session's store observers. Both fire immediately with
    /// the current snapshot and afterwards only on change.
    pub(super) fn attach(&mut self, store: &mut PeerStore) {
        let inbox = self.inbox.clone();
        let peers = store.subscribe(
            |peers: &[Peer]| peers.to_vec(),
            move |peers: &Vec<Peer>| {
                *inbox.borrow_mut() = Some(peers.clone());
            },
        );

        let seen = self.speaker_seen.clone();
        let speakers = store.subscribe(
            |peers: &[Peer]| peers.iter().any(projection::is_speaker),
            move |any: &bool| {
                if *any {
                    seen.set(true);
                }
            },
        );
        self.subscriptions.extend([peers, speakers]);
    }

    /// Drops every observer and cancels every timer. Returns how many timers
    /// were still pending.
    pub(super) fn drain(&mut self, store: &mut PeerStore) -> usize {
        for id in self.subscriptions.drain(..) {
            store.unsubscribe(id);
        }
        let pending = self.timers.clear()
            + self.hands.pending_timers()
            + self.reactions.pending_timers();
        self.hands.clear();
        self.reactions.clear();
        self.chat.clear();
        self.speaking.reset();
        self.inbox.borrow_mut().take();
        self.sheet = None;
        pending
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn creator_fid(&self) -> Option<u64> {
        self.creator_fid
    }

    pub fn is_creator(&self) -> bool {
        self.was_creator
    }

    pub fn projection(&self) -> &PeerProjection {
        &self.projection
    }

    pub fn hands(&self) -> &HandRaises {
        &self.hands
    }

    pub fn reactions(&self) -> &ReactionEngine {
        &self.reactions
    }

    pub fn chat(&self) -> &ChatEngine {
        &self.chat
    }

    pub fn active_speaker(&self) -> Option<&PeerId> {
        self.speaking.active()
    }

    pub fn moderation_sheet(&self) -> Option<&ModerationSheet> {
        self.sheet.as_ref()
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len() + self.hands.pending_timers() + self.reactions.pending_timers()
    }
}
