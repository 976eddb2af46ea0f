//! Local mirror of the SDK peer collection with selector subscriptions.

use crate::peer::{Peer, PeerId};


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Peer])>;

#[derive(Default)]
pub struct PeerStore {
    peers: Vec<Peer>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl PeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.iter().find(|peer| &peer.id == peer_id)
    }

    pub fn local_peer(&self) -> Option<&Peer> {
        self.peers.iter().find(|peer| peer.is_local)
    }

    /// Subscribe to a derived slice of the store. `on_change` fires once
    /// immediately with the current value, then only when `select` yields a
    /// value different from the last one delivered.
    pub fn subscribe<T, S, F>(&mut self, select: S, mut on_change: F) -> SubscriptionId
    where
        T: PartialEq + 'static,
        S: Fn(&[Peer]) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let mut last: Option<T> = None;
        let mut listener: Listener = Box::new(move |peers: &[Peer]| {
            let next = select(peers);
            if last.as_ref() != Some(&next) {
                on_change(&next);
                last = Some(next);
            }
        });
        listener(&self.peers);

        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        before != self.listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn replace_all(&mut self, peers: Vec<Peer>) {
        self.peers = peers;
        self.emit();
    }

    /// Insert or update in place; new peers keep arrival order at the end.
    pub fn upsert(&mut self, peer: Peer) {
        match self.peers.iter_mut().find(|existing| existing.id == peer.id) {
            Some(existing) => *existing = peer,
            None => self.peers.push(peer),
        }
        self.emit();
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> Option<Peer> {
        let index = self.peers.iter().position(|peer| &peer.id == peer_id)?;
        let removed = self.peers.remove(index);
        self.emit();
        Some(removed)
    }

    pub fn clear(&mut self) {
        if !self.peers.is_empty() {
            self.peers.clear();
            self.emit();
        }
    }

    fn emit(&mut self) {
        let Self {
            peers, listeners, ..
        } = self;
        for (_, listener) in listeners.iter_mut() {
            listener(peers);
        }
    }
}
