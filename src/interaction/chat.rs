use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::events::{EventBus, RoomEvent};
use crate::peer::PeerId;
use crate::sdk::ConferenceSdk;

const DEDUP_TEXT_PREFIX_CHARS: usize = 32;
const MAX_RETAINED_MESSAGES: usize = 500;
pub const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_id: PeerId,
    pub text: String,
    pub timestamp: i64, // unix millis
}

impl ChatMessage {
    /// Synthetic identity used to drop redelivered messages.
    pub fn dedup_key(&self) -> String {
        let prefix: String = self.text.chars().take(DEDUP_TEXT_PREFIX_CHARS).collect();
        format!("{}:{}:{}", self.sender_id, self.timestamp, prefix)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatSendError {
    Empty,
    RateLimited(String),
    Failed(String),
}

impl std::fmt::Display for ChatSendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatSendError::Empty => f.write_str("message is empty"),
            ChatSendError::RateLimited(message) | ChatSendError::Failed(message) => {
                f.write_str(message)
            }
        }
    }
}

pub fn badge_text(count: u32) -> Option<String> {
    match count {
        0 => None,
        1..=99 => Some(count.to_string()),
        _ => Some("99+".to_string()),
    }
}

#[derive(Default)]
pub struct ChatEngine {
    messages: Vec<ChatMessage>,
    seen: HashSet<String>,
    panel_open: bool,
    unread: u32,
}

impl ChatEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn unread(&self) -> u32 {
        self.unread
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Throttling is the transport's call; its rejection text is surfaced
    /// verbatim as an informational notice.
    pub fn send<S: ConferenceSdk + ?Sized>(
        &mut self,
        sdk: &mut S,
        local_id: &PeerId,
        text: &str,
        now_millis: i64,
        events: &mut EventBus,
    ) -> Result<(), ChatSendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatSendError::Empty);
        }
        let text: String = text.chars().take(MAX_MESSAGE_CHARS).collect();

        let result = sdk.send_chat(&text);
        if !result.success {
            let message = result
                .message
                .clone()
                .or_else(|| result.error.clone())
                .unwrap_or_else(|| "Failed to send message".to_string());
            if result.is_rate_limited() {
                log::info!("[Chat] send rate limited: {message}");
                events.emit(RoomEvent::ChatCooldown {
                    message: message.clone(),
                });
                events.publish_info("rooms.chat", message.clone());
                return Err(ChatSendError::RateLimited(message));
            }
            log::warn!("[Chat] send failed: {message}");
            events.publish_error("rooms.chat", format!("Message not sent: {message}"));
            return Err(ChatSendError::Failed(message));
        }

        // A later echo from the transport with the same timestamp is dropped
        // by the dedup key. Our own message never counts as unread.
        self.record(
            ChatMessage {
                sender_id: local_id.clone(),
                text,
                timestamp: result.timestamp.unwrap_or(now_millis),
            },
            events,
        );
        Ok(())
    }

    /// Returns false when the message was a duplicate delivery.
    pub fn receive(&mut self, message: ChatMessage, events: &mut EventBus) -> bool {
        if !self.record(message, events) {
            return false;
        }
        if !self.panel_open {
            self.unread = self.unread.saturating_add(1);
            self.emit_unread(events);
        }
        true
    }

    fn record(&mut self, message: ChatMessage, events: &mut EventBus) -> bool {
        if !self.seen.insert(message.dedup_key()) {
            log::debug!(
                "[Chat] dropped duplicate from {} at {}",
                message.sender_id,
                message.timestamp
            );
            return false;
        }

        self.messages.push(message.clone());
        if self.messages.len() > MAX_RETAINED_MESSAGES {
            let overflow = self.messages.len() - MAX_RETAINED_MESSAGES;
            // Dedup keys leave together with the messages they guard.
            for dropped in self.messages.drain(..overflow) {
                self.seen.remove(&dropped.dedup_key());
            }
        }
        events.emit(RoomEvent::ChatMessage { message });
        true
    }

    pub fn open_panel(&mut self, events: &mut EventBus) {
        self.panel_open = true;
        if self.unread != 0 {
            self.unread = 0;
            self.emit_unread(events);
        }
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.seen.clear();
        self.panel_open = false;
        self.unread = 0;
    }

    fn emit_unread(&self, events: &mut EventBus) {
        events.emit(RoomEvent::UnreadChanged {
            count: self.unread,
            badge: badge_text(self.unread),
        });
    }
}
