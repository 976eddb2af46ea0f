//! Speaker/listener partition of the live peer collection.

use std::collections::HashSet;

use crate::peer::{Peer, PeerId, SdkRole};

#[cfg(test)]
mod tests;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeerProjection {
    pub speakers: Vec<Peer>,
    pub listeners: Vec<Peer>,
}

impl PeerProjection {
    pub fn listener_ids(&self) -> Vec<PeerId> {
        self.listeners.iter().map(|peer| peer.id.clone()).collect()
    }

    pub fn is_speaker(&self, peer_id: &PeerId) -> bool {
        self.speakers.iter().any(|peer| &peer.id == peer_id)
    }

    pub fn is_listener(&self, peer_id: &PeerId) -> bool {
        self.listeners.iter().any(|peer| &peer.id == peer_id)
    }

    /// Targeted path for status-only changes: reorder the existing listener
    /// rows in place and return the new order.
    pub fn reorder_listeners(&mut self, raised: &HashSet<PeerId>) -> Vec<PeerId> {
        self.listeners = raised_first(std::mem::take(&mut self.listeners), raised);
        self.listener_ids()
    }
}

/// Metadata creator flag is a fallback for the window where a role change and
/// its metadata have not both propagated yet.
pub fn is_speaker(peer: &Peer) -> bool {
    peer.role == SdkRole::Streamer || peer.decoded_metadata().is_creator
}

pub fn project(peers: &[Peer], raised: &HashSet<PeerId>) -> PeerProjection {
    let (speakers, listeners): (Vec<Peer>, Vec<Peer>) =
        peers.iter().cloned().partition(is_speaker);
    PeerProjection {
        speakers,
        listeners: raised_first(listeners, raised),
    }
}

/// Stable partition: raised hands first, arrival order kept within each group.
fn raised_first(listeners: Vec<Peer>, raised: &HashSet<PeerId>) -> Vec<Peer> {
    let (mut up, down): (Vec<Peer>, Vec<Peer>) = listeners
        .into_iter()
        .partition(|peer| raised.contains(&peer.id));
    up.extend(down);
    up
}
