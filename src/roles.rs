//! Role derivation and the moderation authorization matrix.
//!
//! Roles are never stored: every decision re-derives them from the latest
//! peer snapshot, so a store emission landing mid-action can't leave a stale
//! classification behind.

use crate::peer::{Peer, PeerMetadata, SdkRole};


/// Effective moderation tier. Variant order is the tier order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectiveRole {
    Listener,
    Speaker,
    Cohost,
    Creator,
}

impl EffectiveRole {
    pub fn label(self) -> &'static str {
        match self {
            EffectiveRole::Listener => "listener",
            EffectiveRole::Speaker => "speaker",
            EffectiveRole::Cohost => "cohost",
            EffectiveRole::Creator => "creator",
        }
    }

    pub fn can_moderate(self) -> bool {
        matches!(self, EffectiveRole::Creator | EffectiveRole::Cohost)
    }
}

pub fn classify(role: SdkRole, metadata: &PeerMetadata) -> EffectiveRole {
    if metadata.is_creator {
        EffectiveRole::Creator
    } else if metadata.is_cohost && role == SdkRole::Streamer {
        EffectiveRole::Cohost
    } else if role == SdkRole::Streamer {
        EffectiveRole::Speaker
    } else {
        EffectiveRole::Listener
    }
}

pub fn effective_role(peer: &Peer) -> EffectiveRole {
    classify(peer.role, &peer.decoded_metadata())
}

pub fn can_moderate(peer: &Peer) -> bool {
    effective_role(peer).can_moderate()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModerationAction {
    Promote,
    Demote,
    MakeCohost,
    RemoveCohost,
}

impl ModerationAction {
    pub fn label(self) -> &'static str {
        match self {
            ModerationAction::Promote => "promote",
            ModerationAction::Demote => "demote",
            ModerationAction::MakeCohost => "make cohost",
            ModerationAction::RemoveCohost => "remove cohost",
        }
    }

    fn creator_only(self) -> bool {
        matches!(
            self,
            ModerationAction::MakeCohost | ModerationAction::RemoveCohost
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthorized,
    CreatorOnly,
    SelfTarget,
    TargetIsCreator,
    CohostCannotModerateCohost,
    TargetNotSpeaker,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DenyReason::NotAuthorized => "not authorized to moderate",
            DenyReason::CreatorOnly => "only the room creator can manage cohosts",
            DenyReason::SelfTarget => "cannot moderate yourself",
            DenyReason::TargetIsCreator => "cannot moderate creator",
            DenyReason::CohostCannotModerateCohost => "cohost cannot moderate cohost",
            DenyReason::TargetNotSpeaker => "only speakers can be made cohost",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    Allow,
    Deny(DenyReason),
}

impl Authorization {
    pub fn is_allowed(self) -> bool {
        self == Authorization::Allow
    }
}

pub fn authorize(action: ModerationAction, actor: &Peer, target: &Peer) -> Authorization {
    let actor_role = effective_role(actor);
    let target_role = effective_role(target);

    if !actor_role.can_moderate() {
        return Authorization::Deny(DenyReason::NotAuthorized);
    }
    if actor.id == target.id {
        return Authorization::Deny(DenyReason::SelfTarget);
    }
    if action.creator_only() && actor_role != EffectiveRole::Creator {
        return Authorization::Deny(DenyReason::CreatorOnly);
    }
    if target_role == EffectiveRole::Creator {
        return Authorization::Deny(DenyReason::TargetIsCreator);
    }
    if actor_role == EffectiveRole::Cohost && target_role == EffectiveRole::Cohost {
        return Authorization::Deny(DenyReason::CohostCannotModerateCohost);
    }
    if action == ModerationAction::MakeCohost && target.role != SdkRole::Streamer {
        return Authorization::Deny(DenyReason::TargetNotSpeaker);
    }
    Authorization::Allow
}

/// Actions the moderation sheet may offer `actor` against `target`.
pub fn available_actions(actor: &Peer, target: &Peer) -> Vec<ModerationAction> {
    let target_role = effective_role(target);
    let candidates: &[ModerationAction] = match target_role {
        EffectiveRole::Listener => &[ModerationAction::Promote],
        EffectiveRole::Speaker => &[ModerationAction::Demote, ModerationAction::MakeCohost],
        EffectiveRole::Cohost => &[ModerationAction::Demote, ModerationAction::RemoveCohost],
        EffectiveRole::Creator => &[],
    };
    candidates
        .iter()
        .copied()
        .filter(|action| authorize(*action, actor, target).is_allowed())
        .collect()
}
