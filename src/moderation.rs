//! Moderation actions against the conferencing SDK.
//!
//! Nothing here mutates local state: the peer store only moves when the SDK
//! emits the confirmed change, so a rejected call leaves the room exactly as
//! it was.

use crate::peer::{Peer, SdkRole};
use crate::roles::{authorize, Authorization, DenyReason, ModerationAction};
use crate::sdk::ConferenceSdk;

#[cfg(test)]
mod tests;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModerationError {
    Denied(DenyReason),
    PeerMissing,
    Transport(String),
}

impl std::fmt::Display for ModerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationError::Denied(reason) => write!(f, "{reason}"),
            ModerationError::PeerMissing => f.write_str("participant is no longer in the room"),
            ModerationError::Transport(err) => write!(f, "{err}"),
        }
    }
}

fn ensure_allowed(
    action: ModerationAction,
    actor: &Peer,
    target: &Peer,
) -> Result<(), ModerationError> {
    match authorize(action, actor, target) {
        Authorization::Allow => Ok(()),
        Authorization::Deny(reason) => {
            log::info!(
                "[Moderation] {} denied: actor={}, target={}, reason={}",
                action.label(),
                actor.id,
                target.id,
                reason
            );
            Err(ModerationError::Denied(reason))
        }
    }
}

pub fn execute<S: ConferenceSdk + ?Sized>(
    sdk: &mut S,
    action: ModerationAction,
    actor: &Peer,
    target: &Peer,
) -> Result<(), ModerationError> {
    match action {
        ModerationAction::Promote => promote(sdk, actor, target),
        ModerationAction::Demote => demote(sdk, actor, target),
        ModerationAction::MakeCohost => make_cohost(sdk, actor, target),
        ModerationAction::RemoveCohost => remove_cohost(sdk, actor, target),
    }
}

/// Issues the role change even when the target already streams; the latest
/// snapshot may be stale.
pub fn promote<S: ConferenceSdk + ?Sized>(
    sdk: &mut S,
    actor: &Peer,
    target: &Peer,
) -> Result<(), ModerationError> {
    ensure_allowed(ModerationAction::Promote, actor, target)?;
    sdk.change_role_of_peer(&target.id, SdkRole::Streamer)
        .map_err(|err| {
            log::warn!("[Moderation] promote {} failed: {err}", target.id);
            ModerationError::Transport(format!("Failed to promote: {err}"))
        })?;
    log::info!("[Moderation] promoted {} to speaker", target.id);
    Ok(())
}

/// A cohost target has its cohost flag cleared first and that call is
/// allowed to settle before the role change goes out, so no reader ever
/// sees a viewer still marked as cohost.
pub fn demote<S: ConferenceSdk + ?Sized>(
    sdk: &mut S,
    actor: &Peer,
    target: &Peer,
) -> Result<(), ModerationError> {
    ensure_allowed(ModerationAction::Demote, actor, target)?;

    let metadata = target.decoded_metadata();
    if metadata.is_cohost {
        let cleared = metadata.with_cohost(false).encode();
        if let Err(err) = sdk.change_peer_metadata(&target.id, &cleared) {
            log::warn!(
                "[Moderation] clearing cohost flag on {} failed, demoting anyway: {err}",
                target.id
            );
        }
    }

    sdk.change_role_of_peer(&target.id, SdkRole::Viewer)
        .map_err(|err| {
            log::warn!("[Moderation] demote {} failed: {err}", target.id);
            ModerationError::Transport(format!("Failed to demote: {err}"))
        })?;
    log::info!("[Moderation] demoted {} to listener", target.id);
    Ok(())
}

pub fn make_cohost<S: ConferenceSdk + ?Sized>(
    sdk: &mut S,
    actor: &Peer,
    target: &Peer,
) -> Result<(), ModerationError> {
    ensure_allowed(ModerationAction::MakeCohost, actor, target)?;
    set_cohost_flag(sdk, target, true)
}

pub fn remove_cohost<S: ConferenceSdk + ?Sized>(
    sdk: &mut S,
    actor: &Peer,
    target: &Peer,
) -> Result<(), ModerationError> {
    ensure_allowed(ModerationAction::RemoveCohost, actor, target)?;
    set_cohost_flag(sdk, target, false)
}

fn set_cohost_flag<S: ConferenceSdk + ?Sized>(
    sdk: &mut S,
    target: &Peer,
    is_cohost: bool,
) -> Result<(), ModerationError> {
    let updated = target.decoded_metadata().with_cohost(is_cohost).encode();
    sdk.change_peer_metadata(&target.id, &updated)
        .map_err(|err| {
            log::warn!(
                "[Moderation] setting cohost={} on {} failed: {err}",
                is_cohost,
                target.id
            );
            ModerationError::Transport(format!("Failed to update cohost status: {err}"))
        })?;
    log::info!("[Moderation] {} cohost={}", target.id, is_cohost);
    Ok(())
}
