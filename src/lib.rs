//! Client core for Farcaster frame audio rooms: peer roles and moderation,
//! the speaker/listener projection, ephemeral interactions and the room
//! lifecycle, layered over an external conferencing SDK.

pub mod api;
pub mod events;
pub mod identity;
pub mod interaction;
pub mod lifecycle;
pub mod moderation;
pub mod peer;
pub mod persistence;
pub mod profiles;
pub mod projection;
pub mod roles;
pub mod sdk;
pub mod shared;
pub mod store;
pub mod timers;

#[cfg(test)]
pub(crate) mod testing;
