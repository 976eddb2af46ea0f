use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::peer::PeerId;
use crate::timers::{TimerId, TimerRegistry};

pub const HAND_RAISE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandChange {
    pub peer_id: PeerId,
    pub raised: bool,
    /// Set when the local control should be re-enabled alongside the change.
    pub control_released: bool,
}

/// Per-peer raised hands, each with its own expiry timer.
pub struct HandRaises {
    raised: HashMap<PeerId, TimerId>,
    timers: TimerRegistry<PeerId>,
    local_peer: Option<PeerId>,
}

impl Default for HandRaises {
    fn default() -> Self {
        Self::new()
    }
}

impl HandRaises {
    pub fn new() -> Self {
        Self {
            raised: HashMap::new(),
            timers: TimerRegistry::new(),
            local_peer: None,
        }
    }

    /// The control stays disabled for as long as the local hand is up.
    pub fn control_enabled(&self) -> bool {
        match &self.local_peer {
            Some(local) => !self.raised.contains_key(local),
            None => true,
        }
    }

    pub fn is_raised(&self, peer_id: &PeerId) -> bool {
        self.raised.contains_key(peer_id)
    }

    pub fn raised_set(&self) -> HashSet<PeerId> {
        self.raised.keys().cloned().collect()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Returns `None` when the local hand is already up.
    pub fn raise_local(&mut self, local_id: &PeerId, now: Instant) -> Option<HandChange> {
        if self.raised.contains_key(local_id) {
            return None;
        }
        self.local_peer = Some(local_id.clone());
        self.set_raised(local_id, now);
        Some(HandChange {
            peer_id: local_id.clone(),
            raised: true,
            control_released: false,
        })
    }

    /// Apply a raise/lower signal from another peer. Returns the change only
    /// when the visible status flips.
    pub fn apply_remote(
        &mut self,
        peer_id: &PeerId,
        raised: bool,
        now: Instant,
    ) -> Option<HandChange> {
        if self.local_peer.as_ref() == Some(peer_id) {
            return None;
        }
        let was_raised = self.raised.contains_key(peer_id);
        if raised {
            // A repeated raise restarts the window.
            self.set_raised(peer_id, now);
        } else {
            self.lower(peer_id);
        }
        (was_raised != raised).then(|| HandChange {
            peer_id: peer_id.clone(),
            raised,
            control_released: false,
        })
    }

    /// Drop a peer's hand without the expiry path (left the room, promoted).
    pub fn forget(&mut self, peer_id: &PeerId) -> Option<HandChange> {
        if !self.lower(peer_id) {
            return None;
        }
        Some(HandChange {
            peer_id: peer_id.clone(),
            raised: false,
            control_released: self.local_peer.as_ref() == Some(peer_id),
        })
    }

    pub fn tick(&mut self, now: Instant) -> Vec<HandChange> {
        let mut changes = Vec::new();
        for (id, peer_id) in self.timers.take_due(now) {
            if self.raised.get(&peer_id) != Some(&id) {
                continue;
            }
            self.raised.remove(&peer_id);
            changes.push(HandChange {
                control_released: self.local_peer.as_ref() == Some(&peer_id),
                peer_id,
                raised: false,
            });
        }
        changes
    }

    pub fn clear(&mut self) {
        self.timers.clear();
        self.raised.clear();
        self.local_peer = None;
    }

    fn set_raised(&mut self, peer_id: &PeerId, now: Instant) {
        if let Some(previous) = self.raised.remove(peer_id) {
            self.timers.cancel(previous);
        }
        let timer = self.timers.schedule(now + HAND_RAISE_WINDOW, peer_id.clone());
        self.raised.insert(peer_id.clone(), timer);
    }

    fn lower(&mut self, peer_id: &PeerId) -> bool {
        match self.raised.remove(peer_id) {
            Some(timer) => {
                self.timers.cancel(timer);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> PeerId {
        PeerId::new(value)
    }

    #[test]
    fn test_local_raise_disables_control_until_expiry() {
        let start = Instant::now();
        let mut hands = HandRaises::new();
        let me = id("me");

        let change = hands.raise_local(&me, start).expect("first raise applies");
        assert!(change.raised);
        assert!(!hands.control_enabled());
        assert!(hands.raise_local(&me, start).is_none());

        assert!(hands.tick(start + Duration::from_secs(9)).is_empty());
        let changes = hands.tick(start + HAND_RAISE_WINDOW);
        assert_eq!(
            changes,
            vec![HandChange {
                peer_id: me.clone(),
                raised: false,
                control_released: true,
            }]
        );
        assert!(hands.control_enabled());
        assert!(!hands.is_raised(&me));
        assert_eq!(hands.pending_timers(), 0);
    }

    #[test]
    fn test_remote_raise_restarts_window() {
        let start = Instant::now();
        let mut hands = HandRaises::new();
        let other = id("other");

        assert!(hands.apply_remote(&other, true, start).is_some());
        assert!(hands
            .apply_remote(&other, true, start + Duration::from_secs(8))
            .is_none());
        assert_eq!(hands.pending_timers(), 1);

        assert!(hands.tick(start + Duration::from_secs(12)).is_empty());
        assert_eq!(hands.tick(start + Duration::from_secs(18)).len(), 1);
    }

    #[test]
    fn test_remote_lower_cancels_timer() {
        let start = Instant::now();
        let mut hands = HandRaises::new();
        let other = id("other");
        hands.apply_remote(&other, true, start);

        let change = hands.apply_remote(&other, false, start).expect("lowered");
        assert!(!change.raised);
        assert_eq!(hands.pending_timers(), 0);
        assert!(hands.apply_remote(&other, false, start).is_none());
    }

    #[test]
    fn test_clear_drains_everything() {
        let start = Instant::now();
        let mut hands = HandRaises::new();
        hands.raise_local(&id("me"), start);
        hands.apply_remote(&id("a"), true, start);
        hands.clear();
        assert_eq!(hands.pending_timers(), 0);
        assert!(hands.raised_set().is_empty());
        assert!(hands.control_enabled());
        assert!(hands.tick(start + HAND_RAISE_WINDOW).is_empty());
    }

    #[test]
    fn test_forget_local_releases_control() {
        let start = Instant::now();
        let mut hands = HandRaises::new();
        let me = id("me");
        hands.raise_local(&me, start);
        let change = hands.forget(&me).expect("was raised");
        assert!(change.control_released);
        assert!(hands.control_enabled());
    }
}
