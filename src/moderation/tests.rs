use super::*;
use crate::peer::PeerMetadata;
use crate::roles::{effective_role, EffectiveRole};
use crate::testing::{FakeSdk, SdkCall};

fn creator() -> Peer {
    Peer::new("creator", SdkRole::Streamer)
        .with_metadata(&PeerMetadata {
            fid: Some(1),
            is_creator: true,
            ..PeerMetadata::default()
        })
        .local()
}

fn cohost(id: &str, fid: u64) -> Peer {
    Peer::new(id, SdkRole::Streamer).with_metadata(&PeerMetadata {
        fid: Some(fid),
        is_cohost: true,
        ..PeerMetadata::default()
    })
}

fn speaker(id: &str) -> Peer {
    Peer::new(id, SdkRole::Streamer)
}

fn listener(id: &str) -> Peer {
    Peer::new(id, SdkRole::Viewer)
}

fn sdk_with(peers: Vec<Peer>) -> FakeSdk {
    let mut sdk = FakeSdk::new();
    sdk.seed_peers(peers);
    sdk
}

#[test]
fn test_viewer_promote_is_denied_without_sdk_call() {
    let actor = listener("me");
    let target = listener("other");
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    let err = promote(&mut sdk, &actor, &target).unwrap_err();
    assert_eq!(err, ModerationError::Denied(DenyReason::NotAuthorized));
    assert!(sdk.calls.is_empty());
}

#[test]
fn test_promote_issues_role_change_even_when_already_streamer() {
    let actor = creator();
    let target = speaker("s1");
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    promote(&mut sdk, &actor, &target).expect("promote");
    assert_eq!(
        sdk.calls,
        vec![SdkCall::ChangeRole(target.id.clone(), SdkRole::Streamer)]
    );
}

#[test]
fn test_cohost_cannot_demote_cohost() {
    let actor = cohost("c1", 2);
    let target = cohost("c2", 3);
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    let err = demote(&mut sdk, &actor, &target).unwrap_err();
    assert_eq!(
        err,
        ModerationError::Denied(DenyReason::CohostCannotModerateCohost)
    );
    assert_eq!(err.to_string(), "cohost cannot moderate cohost");
    assert!(sdk.calls.is_empty());
}

#[test]
fn test_creator_demotes_cohost_clearing_flag_first() {
    let actor = creator();
    let target = cohost("c1", 2);
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    demote(&mut sdk, &actor, &target).expect("demote");

    assert_eq!(sdk.calls.len(), 2);
    assert!(matches!(&sdk.calls[0], SdkCall::ChangeMetadata(id, _) if id == &target.id));
    assert_eq!(
        sdk.calls[1],
        SdkCall::ChangeRole(target.id.clone(), SdkRole::Viewer)
    );

    // No observer ever sees a viewer still flagged as cohost.
    for snapshot in &sdk.snapshots {
        let observed = snapshot.iter().find(|p| p.id == target.id).expect("target");
        let meta = observed.decoded_metadata();
        assert!(!(observed.role == SdkRole::Viewer && meta.is_cohost));
    }

    let settled = sdk.peers.iter().find(|p| p.id == target.id).expect("target");
    assert_eq!(settled.role, SdkRole::Viewer);
    assert!(!settled.decoded_metadata().is_cohost);
    assert_eq!(settled.decoded_metadata().fid, Some(2));
    assert_eq!(effective_role(settled), EffectiveRole::Listener);
}

#[test]
fn test_demote_proceeds_when_metadata_clear_fails() {
    let actor = creator();
    let target = cohost("c1", 2);
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);
    sdk.fail("change_peer_metadata", "metadata rejected");

    demote(&mut sdk, &actor, &target).expect("role change still issued");
    assert_eq!(
        sdk.calls.last(),
        Some(&SdkCall::ChangeRole(target.id.clone(), SdkRole::Viewer))
    );
}

#[test]
fn test_demote_plain_speaker_skips_metadata() {
    let actor = creator();
    let target = speaker("s1");
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    demote(&mut sdk, &actor, &target).expect("demote");
    assert_eq!(
        sdk.calls,
        vec![SdkCall::ChangeRole(target.id.clone(), SdkRole::Viewer)]
    );
}

#[test]
fn test_creator_cannot_demote_self() {
    let actor = creator();
    let mut sdk = sdk_with(vec![actor.clone()]);

    let err = demote(&mut sdk, &actor, &actor).unwrap_err();
    assert_eq!(err, ModerationError::Denied(DenyReason::SelfTarget));
    assert!(sdk.calls.is_empty());
}

#[test]
fn test_transport_failure_is_reported_and_state_unchanged() {
    let actor = creator();
    let target = listener("l1");
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);
    sdk.fail("change_role_of_peer", "timeout");

    let err = promote(&mut sdk, &actor, &target).unwrap_err();
    assert_eq!(
        err,
        ModerationError::Transport("Failed to promote: timeout".to_string())
    );
    assert!(sdk.snapshots.is_empty());
    let unchanged = sdk.peers.iter().find(|p| p.id == target.id).expect("target");
    assert_eq!(unchanged.role, SdkRole::Viewer);
}

#[test]
fn test_make_and_remove_cohost_touch_metadata_only() {
    let actor = creator();
    let target = speaker("s1");
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    make_cohost(&mut sdk, &actor, &target).expect("make cohost");
    let promoted = sdk.peers[1].clone();
    assert_eq!(effective_role(&promoted), EffectiveRole::Cohost);

    remove_cohost(&mut sdk, &actor, &promoted).expect("remove cohost");
    assert_eq!(effective_role(&sdk.peers[1]), EffectiveRole::Speaker);
    assert!(sdk
        .calls
        .iter()
        .all(|call| matches!(call, SdkCall::ChangeMetadata(..))));
}

#[test]
fn test_cohost_cannot_manage_cohosts() {
    let actor = cohost("c1", 2);
    let target = speaker("s1");
    let mut sdk = sdk_with(vec![actor.clone(), target.clone()]);

    assert_eq!(
        execute(&mut sdk, ModerationAction::MakeCohost, &actor, &target),
        Err(ModerationError::Denied(DenyReason::CreatorOnly))
    );
    // Plain moderation below the cohost tier is still allowed.
    execute(&mut sdk, ModerationAction::Demote, &actor, &target).expect("demote");
}
