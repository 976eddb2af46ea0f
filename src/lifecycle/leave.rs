use super::*;
use crate::api::DisableRoomRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveChoice {
    EndForEveryone,
    LeaveOnly,
    Abort,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    Ended,
    /// The room could not be disabled on the backend, but the local leave
    /// still went through.
    EndedWithPartialFailure(String),
    Aborted,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveFlow {
    /// Creator with a known room: nothing has been sent yet.
    ConfirmationRequired { room_id: String },
    Completed(LeaveOutcome),
}

impl<S: ConferenceSdk, B: RoomsBackend> RoomController<S, B> {
    pub fn request_leave(&mut self) -> LeaveFlow {
        if let (true, Some(room_id)) = (self.is_creator(), self.room_id()) {
            return LeaveFlow::ConfirmationRequired {
                room_id: room_id.to_string(),
            };
        }
        LeaveFlow::Completed(self.leave_now())
    }

    pub fn resolve_leave(&mut self, choice: LeaveChoice) -> LeaveOutcome {
        match choice {
            LeaveChoice::Abort => LeaveOutcome::Aborted,
            LeaveChoice::LeaveOnly => self.leave_now(),
            LeaveChoice::EndForEveryone => self.end_for_everyone(),
        }
    }

    fn leave_now(&mut self) -> LeaveOutcome {
        if self.state == ConnectionState::Disconnected {
            return LeaveOutcome::Left;
        }
        if let Err(err) = self.sdk.leave() {
            log::error!("[Rooms] leave failed: {err}");
            self.events
                .publish_error("rooms.leave", format!("Failed to leave room: {err}"));
            return LeaveOutcome::Failed(err);
        }
        self.on_disconnected();
        self.events.publish_info("rooms.leave", "You left the room.");
        LeaveOutcome::Left
    }

    /// Disable on the backend first, then leave no matter how that went.
    fn end_for_everyone(&mut self) -> LeaveOutcome {
        let Some(room_id) = self.room_id().map(str::to_string) else {
            return self.leave_now();
        };
        self.events.publish_progress(
            "rooms.end",
            format!("Ending room {}...", short_room_id(&room_id)),
        );

        let disabled = self.identity.require().and_then(|(fid, address)| {
            self.backend
                .disable_room(&DisableRoomRequest {
                    room_id: room_id.clone(),
                    address,
                    fid,
                })
                .and_then(|response| {
                    if response.success {
                        Ok(())
                    } else {
                        Err(response
                            .message
                            .unwrap_or_else(|| "Room could not be ended".to_string()))
                    }
                })
        });

        match self.leave_now() {
            LeaveOutcome::Left => {}
            other => return other,
        }

        match disabled {
            Ok(()) => {
                log::info!("[Rooms] room {room_id} ended for everyone");
                self.durable.clear();
                self.events.publish_success(
                    "rooms.end",
                    format!("Room {} ended.", short_room_id(&room_id)),
                );
                LeaveOutcome::Ended
            }
            Err(err) => {
                log::error!("[Rooms] disable room {room_id} failed: {err}");
                self.events.publish_error(
                    "rooms.end",
                    format!("You left, but the room could not be ended: {err}"),
                );
                LeaveOutcome::EndedWithPartialFailure(err)
            }
        }
    }

    /// Cross-peer "room disabled" broadcast. Returns true when it forced a
    /// leave.
    pub fn on_room_disabled(&mut self, room_id: &str) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        if self.is_creator() {
            log::debug!("[Rooms] ignoring own room-disabled broadcast for {room_id}");
            return false;
        }
        if self.room_id() != Some(room_id) {
            return false;
        }

        log::info!("[Rooms] room {room_id} was ended by the host");
        if let Err(err) = self.sdk.leave() {
            log::warn!("[Rooms] leave after room end failed: {err}");
        }
        self.on_disconnected();
        self.durable.clear();
        self.events.emit(RoomEvent::RoomEnded {
            room_id: room_id.to_string(),
        });
        self.events
            .publish_error("rooms.ended", "This room has been ended by the host.");
        true
    }

    /// Tears the session down. Safe to call more than once.
    pub fn on_disconnected(&mut self) {
        self.pending_room_id = None;
        if let Some(mut session) = self.session.take() {
            let pending = session.drain(&mut self.store);
            log::info!(
                "[Rooms] session torn down: room={:?}, cancelled_timers={}",
                session.room_id,
                pending
            );
        }
        self.store.clear();
        self.set_state(ConnectionState::Disconnected);
    }
}
