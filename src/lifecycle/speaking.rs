use std::time::Duration;

use crate::peer::{Peer, PeerId};

pub const SPEAKING_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const SPEAKING_THRESHOLD: f32 = 0.05;

/// Tracks the loudest speaker above the threshold.
#[derive(Debug, Default)]
pub struct SpeakingDetector {
    active: Option<PeerId>,
}

impl SpeakingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&PeerId> {
        self.active.as_ref()
    }

    /// Returns `Some(new_active)` only when the active speaker changed.
    pub fn poll<F>(&mut self, speakers: &[Peer], level_of: F) -> Option<Option<PeerId>>
    where
        F: Fn(&PeerId) -> f32,
    {
        let loudest = speakers
            .iter()
            .map(|peer| (&peer.id, level_of(&peer.id)))
            .filter(|(_, level)| *level > SPEAKING_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id.clone());

        if loudest == self.active {
            return None;
        }
        self.active = loudest.clone();
        Some(loudest)
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}
