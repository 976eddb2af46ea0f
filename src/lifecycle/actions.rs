use std::time::Instant;

use super::*;
use crate::interaction::chat::{ChatMessage, ChatSendError};
use crate::interaction::reactions::{is_supported_emoji, ReactionError};
use crate::moderation::{self, ModerationError};
use crate::roles::{available_actions, ModerationAction};
use crate::sdk::RoomSignal;

impl<S: ConferenceSdk, B: RoomsBackend> RoomController<S, B> {
    // -- hand raise -------------------------------------------------------------

    /// Raises the local hand for the fixed window. The local state flips
    /// before the signal goes out and expires on its own regardless of
    /// whether anyone received it.
    pub fn raise_hand(&mut self, now: Instant) -> Result<(), String> {
        let Some(local) = self.store.local_peer().cloned() else {
            return Err("Not connected to a room.".to_string());
        };
        let Some(session) = self.session.as_mut() else {
            return Err("Not connected to a room.".to_string());
        };
        if projection::is_speaker(&local) {
            return Err("Speakers don't need to raise a hand.".to_string());
        }
        let Some(change) = session.hands.raise_local(&local.id, now) else {
            return Ok(());
        };

        let listener_order = session
            .projection
            .reorder_listeners(&session.hands.raised_set());
        self.events
            .emit(RoomEvent::HandRaiseControl { enabled: false });
        self.events.emit(RoomEvent::HandRaiseChanged {
            peer_id: change.peer_id,
            raised: true,
            listener_order,
        });

        if let Err(err) = self.sdk.send_signal(&RoomSignal::HandRaise { raised: true }) {
            log::warn!("[Rooms] hand raise signal failed: {err}");
            self.events
                .publish_error("rooms.hand", format!("Hand raise not sent: {err}"));
            return Err(err);
        }
        Ok(())
    }

    /// Routes a data-channel signal from another peer.
    pub fn on_signal(&mut self, sender: &PeerId, signal: RoomSignal, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            log::debug!("[Rooms] signal from {sender} dropped, no session");
            return;
        };
        match signal {
            RoomSignal::HandRaise { raised } => {
                if session.projection.is_speaker(sender) {
                    return;
                }
                if let Some(change) = session.hands.apply_remote(sender, raised, now) {
                    let listener_order = session
                        .projection
                        .reorder_listeners(&session.hands.raised_set());
                    self.events.emit(RoomEvent::HandRaiseChanged {
                        peer_id: change.peer_id,
                        raised: change.raised,
                        listener_order,
                    });
                }
            }
            RoomSignal::Reaction { emoji } => {
                if !is_supported_emoji(&emoji) {
                    log::debug!("[Reactions] ignoring unsupported reaction from {sender}");
                    return;
                }
                session
                    .reactions
                    .receive(sender, &emoji, now, &mut self.events);
            }
        }
    }

    // -- reactions --------------------------------------------------------------

    pub fn open_reaction_picker(&mut self, now: Instant) -> Result<(), ReactionError> {
        let Some(session) = self.session.as_ref() else {
            return Err(ReactionError::Transport("not connected".to_string()));
        };
        session.reactions.check_cooldown(now, &mut self.events)
    }

    /// Sends a reaction and renders the local burst. The transport does not
    /// echo our own signals back, so the local copy is the only one.
    pub fn send_reaction(&mut self, emoji: &str, now: Instant) -> Result<(), ReactionError> {
        let local_id = self
            .local_peer_id()
            .ok_or_else(|| ReactionError::Transport("not connected".to_string()))?;
        let Some(session) = self.session.as_mut() else {
            return Err(ReactionError::Transport("not connected".to_string()));
        };
        session.reactions.check_cooldown(now, &mut self.events)?;
        if !is_supported_emoji(emoji) {
            return Err(ReactionError::UnknownEmoji);
        }

        let signal = RoomSignal::Reaction {
            emoji: emoji.to_string(),
        };
        if let Err(err) = self.sdk.send_signal(&signal) {
            log::warn!("[Reactions] send failed: {err}");
            self.events
                .publish_error("rooms.reaction", format!("Reaction not sent: {err}"));
            return Err(ReactionError::Transport(err));
        }
        session.reactions.mark_sent(now);
        session
            .reactions
            .receive(&local_id, emoji, now, &mut self.events);
        Ok(())
    }

    // -- chat -------------------------------------------------------------------

    pub fn send_chat(&mut self, text: &str) -> Result<(), ChatSendError> {
        let local_id = self
            .local_peer_id()
            .ok_or_else(|| ChatSendError::Failed("Not connected to a room.".to_string()))?;
        let Some(session) = self.session.as_mut() else {
            return Err(ChatSendError::Failed("Not connected to a room.".to_string()));
        };
        let now_millis = chrono::Utc::now().timestamp_millis();
        session
            .chat
            .send(&mut self.sdk, &local_id, text, now_millis, &mut self.events)
    }

    pub fn on_chat_message(&mut self, message: ChatMessage) -> bool {
        match self.session.as_mut() {
            Some(session) => session.chat.receive(message, &mut self.events),
            None => false,
        }
    }

    pub fn open_chat(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.chat.open_panel(&mut self.events);
        }
    }

    pub fn close_chat(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.chat.close_panel();
        }
    }

    // -- audio ------------------------------------------------------------------

    /// Returns the new muted state. A transport rejection leaves it as it was.
    pub fn toggle_mute(&mut self) -> Result<bool, String> {
        let Some(session) = self.session.as_mut() else {
            return Err("Not connected to a room.".to_string());
        };
        let next_muted = !session.is_muted;
        if let Err(err) = self.sdk.set_local_audio_enabled(!next_muted) {
            log::warn!("[Rooms] mute toggle failed: {err}");
            let verb = if next_muted { "mute" } else { "unmute" };
            self.events
                .publish_error("rooms.audio", format!("Failed to {verb}: {err}"));
            return Err(err);
        }
        session.is_muted = next_muted;
        log::info!("[Rooms] local audio muted={next_muted}");
        Ok(next_muted)
    }

    // -- moderation -------------------------------------------------------------

    /// Opens the sheet for `target` and returns the actions it may offer.
    /// Missing peers are a silent no-op.
    pub fn open_moderation(&mut self, target: &PeerId) -> Vec<ModerationAction> {
        let (Some(actor), Some(target_peer)) = (self.store.local_peer(), self.store.get(target))
        else {
            return Vec::new();
        };
        let actions = available_actions(actor, target_peer);
        if actions.is_empty() {
            return actions;
        }
        if let Some(session) = self.session.as_mut() {
            session.sheet = Some(ModerationSheet {
                target: target.clone(),
            });
        }
        actions
    }

    pub fn close_moderation(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.sheet = None;
        }
    }

    /// Runs `action` against the sheet's target using the latest snapshot of
    /// both peers. The store only changes once the SDK reports it.
    pub fn moderate(&mut self, action: ModerationAction) -> Result<(), ModerationError> {
        let target_id = self
            .session
            .as_ref()
            .and_then(|session| session.sheet.as_ref())
            .map(|sheet| sheet.target.clone())
            .ok_or(ModerationError::PeerMissing)?;
        let actor = self
            .store
            .local_peer()
            .cloned()
            .ok_or(ModerationError::PeerMissing)?;
        let target = self
            .store
            .get(&target_id)
            .cloned()
            .ok_or(ModerationError::PeerMissing)?;

        match moderation::execute(&mut self.sdk, action, &actor, &target) {
            Ok(()) => {
                self.events.publish_success(
                    "rooms.moderation",
                    format!("{} applied to {}", action.label(), target.display_name()),
                );
                self.close_moderation();
                Ok(())
            }
            Err(err) => {
                self.events.publish_error(
                    "rooms.moderation",
                    format!("Could not {}: {err}", action.label()),
                );
                Err(err)
            }
        }
    }
}
