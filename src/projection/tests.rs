use super::*;
use crate::peer::PeerMetadata;

fn ids(peers: &[Peer]) -> Vec<&str> {
    peers.iter().map(|peer| peer.id.as_str()).collect()
}

fn raised(list: &[&str]) -> HashSet<PeerId> {
    list.iter().map(|id| PeerId::new(*id)).collect()
}

#[test]
fn test_listener_order_raised_first_stable() {
    let peers = vec![
        Peer::new("A", SdkRole::Viewer),
        Peer::new("B", SdkRole::Viewer),
        Peer::new("C", SdkRole::Viewer),
        Peer::new("D", SdkRole::Viewer),
    ];
    let projection = project(&peers, &raised(&["B", "D"]));
    assert_eq!(ids(&projection.listeners), vec!["B", "D", "A", "C"]);
    assert!(projection.speakers.is_empty());
}

#[test]
fn test_speaker_partition_uses_role_or_creator_flag() {
    let creator_meta = PeerMetadata {
        is_creator: true,
        ..PeerMetadata::default()
    };
    let peers = vec![
        Peer::new("viewer", SdkRole::Viewer),
        Peer::new("streamer", SdkRole::Streamer),
        Peer::new("creator-lagging", SdkRole::Viewer).with_metadata(&creator_meta),
    ];
    let projection = project(&peers, &HashSet::new());
    assert_eq!(ids(&projection.speakers), vec!["streamer", "creator-lagging"]);
    assert_eq!(ids(&projection.listeners), vec!["viewer"]);
}

#[test]
fn test_malformed_metadata_viewer_is_listener() {
    let peers = vec![Peer::new("x", SdkRole::Viewer).with_raw_metadata("{{{")];
    let projection = project(&peers, &HashSet::new());
    assert_eq!(ids(&projection.listeners), vec!["x"]);
}

#[test]
fn test_reorder_keeps_rows_without_reprojecting() {
    let peers = vec![
        Peer::new("A", SdkRole::Viewer),
        Peer::new("B", SdkRole::Viewer),
        Peer::new("C", SdkRole::Viewer),
    ];
    let mut projection = project(&peers, &HashSet::new());
    let order = projection.reorder_listeners(&raised(&["C"]));
    assert_eq!(
        order,
        vec![PeerId::new("C"), PeerId::new("A"), PeerId::new("B")]
    );

    let order = projection.reorder_listeners(&HashSet::new());
    // Lowering keeps the current relative order of the remaining rows.
    assert_eq!(
        order,
        vec![PeerId::new("C"), PeerId::new("A"), PeerId::new("B")]
    );
}

#[test]
fn test_raised_speaker_is_ignored_for_ordering() {
    let peers = vec![
        Peer::new("S", SdkRole::Streamer),
        Peer::new("A", SdkRole::Viewer),
    ];
    let projection = project(&peers, &raised(&["S"]));
    assert_eq!(ids(&projection.speakers), vec!["S"]);
    assert_eq!(ids(&projection.listeners), vec!["A"]);
}
