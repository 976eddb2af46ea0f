//! Emoji reaction bursts. A sender owns at most one live burst; a new
//! reaction from the same sender purges the previous one (particles,
//! container and every pending timer) before the new burst is created.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::events::{EventBus, RoomEvent};
use crate::peer::PeerId;
use crate::timers::{TimerId, TimerRegistry};

pub const REACTION_COOLDOWN: Duration = Duration::from_secs(3);
pub const PARTICLE_COUNT: RangeInclusive<usize> = 5..=8;
pub const PARTICLE_DURATION_MS: RangeInclusive<u64> = 1_500..=2_500;
pub const PARTICLE_MAX_DELAY_MS: u64 = 500;
/// Backstop removal for the whole burst container.
pub const BURST_LIFETIME: Duration = Duration::from_secs(4);

pub const REACTION_EMOJIS: &[&str] = &["🔥", "❤️", "😂", "👏", "🎉", "💯", "🙌", "👀"];

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub index: usize,
    pub offset_x: f32,
    pub offset_y: f32,
    pub size_px: f32,
    pub rotation_deg: f32,
    pub delay_ms: u64,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Burst {
    pub id: u64,
    pub sender_id: PeerId,
    pub emoji: String,
    pub particles: Vec<Particle>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactionError {
    Cooldown { remaining_secs: u64 },
    UnknownEmoji,
    Transport(String),
}

impl std::fmt::Display for ReactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionError::Cooldown { remaining_secs } => {
                write!(f, "wait {remaining_secs}s before reacting again")
            }
            ReactionError::UnknownEmoji => f.write_str("unsupported reaction"),
            ReactionError::Transport(err) => write!(f, "reaction failed: {err}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ReactionTimer {
    Particle {
        sender: PeerId,
        burst_id: u64,
        index: usize,
    },
    Container {
        sender: PeerId,
        burst_id: u64,
    },
}

struct ActiveBurst {
    burst: Burst,
    live_particles: HashSet<usize>,
    timers: Vec<TimerId>,
}

pub struct ReactionEngine {
    active: HashMap<PeerId, ActiveBurst>,
    timers: TimerRegistry<ReactionTimer>,
    last_sent_at: Option<Instant>,
    next_burst_id: u64,
    rng: StdRng,
}

impl Default for ReactionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactionEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            active: HashMap::new(),
            timers: TimerRegistry::new(),
            last_sent_at: None,
            next_burst_id: 0,
            rng,
        }
    }

    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let sent = self.last_sent_at?;
        let elapsed = now.saturating_duration_since(sent);
        (elapsed < REACTION_COOLDOWN).then(|| REACTION_COOLDOWN - elapsed)
    }

    /// Gate for opening the picker. During cooldown this reports the remaining
    /// whole seconds (rounded up) and never touches the transport.
    pub fn check_cooldown(&self, now: Instant, events: &mut EventBus) -> Result<(), ReactionError> {
        match self.cooldown_remaining(now) {
            Some(remaining) => {
                let remaining_secs = ceil_secs(remaining);
                events.emit(RoomEvent::ReactionCooldown { remaining_secs });
                Err(ReactionError::Cooldown { remaining_secs })
            }
            None => Ok(()),
        }
    }

    /// Starts the sender-side cooldown. Called only after the transport
    /// accepted the reaction.
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent_at = Some(now);
    }

    pub fn active_burst(&self, sender: &PeerId) -> Option<&Burst> {
        self.active.get(sender).map(|active| &active.burst)
    }

    pub fn active_burst_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn receive(&mut self, sender: &PeerId, emoji: &str, now: Instant, events: &mut EventBus) {
        self.purge(sender, events);

        self.next_burst_id += 1;
        let burst_id = self.next_burst_id;
        let count = self.rng.gen_range(PARTICLE_COUNT);
        let particles: Vec<Particle> = (0..count).map(|index| self.particle(index)).collect();

        let mut timers = Vec::with_capacity(particles.len() + 1);
        for particle in &particles {
            let life = Duration::from_millis(particle.delay_ms + particle.duration_ms);
            timers.push(self.timers.schedule(
                now + life,
                ReactionTimer::Particle {
                    sender: sender.clone(),
                    burst_id,
                    index: particle.index,
                },
            ));
        }
        timers.push(self.timers.schedule(
            now + BURST_LIFETIME,
            ReactionTimer::Container {
                sender: sender.clone(),
                burst_id,
            },
        ));

        let burst = Burst {
            id: burst_id,
            sender_id: sender.clone(),
            emoji: emoji.to_string(),
            particles,
        };
        log::debug!(
            "[Reactions] burst {} from {} with {} particles",
            burst_id,
            sender,
            burst.particles.len()
        );
        self.active.insert(
            sender.clone(),
            ActiveBurst {
                live_particles: burst.particles.iter().map(|p| p.index).collect(),
                burst: burst.clone(),
                timers,
            },
        );
        events.emit(RoomEvent::ReactionReceived { burst });
    }

    /// Remove a sender's live burst and cancel all of its timers.
    pub fn purge(&mut self, sender: &PeerId, events: &mut EventBus) -> bool {
        let Some(active) = self.active.remove(sender) else {
            return false;
        };
        self.timers.cancel_all(active.timers);
        events.emit(RoomEvent::BurstRemoved {
            sender_id: sender.clone(),
            burst_id: active.burst.id,
        });
        true
    }

    pub fn tick(&mut self, now: Instant, events: &mut EventBus) {
        for (_, timer) in self.timers.take_due(now) {
            match timer {
                ReactionTimer::Particle {
                    sender,
                    burst_id,
                    index,
                } => {
                    let Some(active) = self.active.get_mut(&sender) else {
                        continue;
                    };
                    if active.burst.id != burst_id || !active.live_particles.remove(&index) {
                        continue;
                    }
                    events.emit(RoomEvent::ParticleRemoved {
                        sender_id: sender.clone(),
                        burst_id,
                        particle: index,
                    });
                    if active.live_particles.is_empty() {
                        self.purge(&sender, events);
                    }
                }
                ReactionTimer::Container { sender, burst_id } => {
                    if self.active.get(&sender).map(|a| a.burst.id) == Some(burst_id) {
                        self.purge(&sender, events);
                    }
                }
            }
        }
    }

    /// Session teardown: drop every burst and timer without emitting.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.active.clear();
        self.last_sent_at = None;
    }

    fn particle(&mut self, index: usize) -> Particle {
        Particle {
            index,
            offset_x: self.rng.gen_range(-40.0..=40.0),
            offset_y: self.rng.gen_range(-10.0..=10.0),
            size_px: self.rng.gen_range(20.0..=36.0),
            rotation_deg: self.rng.gen_range(-30.0..=30.0),
            delay_ms: self.rng.gen_range(0..=PARTICLE_MAX_DELAY_MS),
            duration_ms: self.rng.gen_range(PARTICLE_DURATION_MS),
        }
    }
}

pub fn is_supported_emoji(emoji: &str) -> bool {
    REACTION_EMOJIS.contains(&emoji)
}

fn ceil_secs(duration: Duration) -> u64 {
    let millis = duration.as_millis() as u64;
    millis.div_ceil(1000).max(1)
}
