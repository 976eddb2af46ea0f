//! Typed notification surface consumed by the presentation layer.

use crate::interaction::chat::ChatMessage;
use crate::interaction::reactions::Burst;
use crate::lifecycle::ConnectionState;
use crate::peer::{Peer, PeerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Progress,
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RoomEvent {
    ConnectionStateChanged {
        state: ConnectionState,
    },
    /// Full replacement of both lists.
    PeersChanged {
        speakers: Vec<Peer>,
        listeners: Vec<Peer>,
    },
    /// Status-only change: consumers reorder existing listener rows to
    /// `listener_order` instead of rebuilding them.
    HandRaiseChanged {
        peer_id: PeerId,
        raised: bool,
        listener_order: Vec<PeerId>,
    },
    HandRaiseControl {
        enabled: bool,
    },
    ReactionReceived {
        burst: Burst,
    },
    ParticleRemoved {
        sender_id: PeerId,
        burst_id: u64,
        particle: usize,
    },
    BurstRemoved {
        sender_id: PeerId,
        burst_id: u64,
    },
    ReactionCooldown {
        remaining_secs: u64,
    },
    ChatMessage {
        message: ChatMessage,
    },
    ChatCooldown {
        message: String,
    },
    UnreadChanged {
        count: u32,
        badge: Option<String>,
    },
    ActiveSpeakerChanged {
        peer_id: Option<PeerId>,
    },
    DurationTick {
        seconds: u64,
        label: String,
    },
    Notice {
        key: String,
        level: NoticeLevel,
        message: String,
    },
    RoomEnded {
        room_id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&RoomEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F: FnMut(&RoomEvent) + 'static>(&mut self, listener: F) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        before != self.listeners.len()
    }

    pub fn emit(&mut self, event: RoomEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn publish_progress(&mut self, key: &str, message: impl Into<String>) {
        self.notice(key, NoticeLevel::Progress, message.into());
    }

    pub fn publish_info(&mut self, key: &str, message: impl Into<String>) {
        self.notice(key, NoticeLevel::Info, message.into());
    }

    pub fn publish_success(&mut self, key: &str, message: impl Into<String>) {
        self.notice(key, NoticeLevel::Success, message.into());
    }

    pub fn publish_error(&mut self, key: &str, message: impl Into<String>) {
        self.notice(key, NoticeLevel::Error, message.into());
    }

    fn notice(&mut self, key: &str, level: NoticeLevel, message: String) {
        self.emit(RoomEvent::Notice {
            key: key.to_string(),
            level,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_fan_out_and_unsubscribe() {
        let mut bus = EventBus::new();
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let sink_a = first.clone();
        let sink_b = second.clone();
        let id_a = bus.subscribe(move |event| sink_a.borrow_mut().push(event.clone()));
        bus.subscribe(move |event| sink_b.borrow_mut().push(event.clone()));

        bus.publish_info("rooms.test", "hello");
        assert!(bus.unsubscribe(id_a));
        bus.publish_error("rooms.test", "boom");

        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 2);
        assert_eq!(
            second.borrow()[1],
            RoomEvent::Notice {
                key: "rooms.test".to_string(),
                level: NoticeLevel::Error,
                message: "boom".to_string(),
            }
        );
    }
}
