//! Ephemeral, non-persisted interaction state: hand raises, emoji bursts and
//! chat. Each sub-engine owns its timers and drains them on `clear`.

pub mod chat;
pub mod hand_raise;
pub mod reactions;
