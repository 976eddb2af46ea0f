//! Farcaster profile lookups with a client-side TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::peer::PeerProfile;

pub const PROFILE_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FarcasterProfile {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
    pub bio: Option<String>,
}

impl FarcasterProfile {
    /// The subset carried in peer metadata.
    pub fn to_peer_profile(&self) -> PeerProfile {
        PeerProfile {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            pfp_url: self.pfp_url.clone(),
        }
    }
}

pub trait ProfileLookup {
    fn lookup(&self, fid: u64) -> Result<FarcasterProfile, String>;
}

pub struct ProfileCache<L> {
    lookup: L,
    ttl: Duration,
    entries: HashMap<u64, (Instant, FarcasterProfile)>,
}

impl<L: ProfileLookup> ProfileCache<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_ttl(lookup, PROFILE_CACHE_TTL)
    }

    pub fn with_ttl(lookup: L, ttl: Duration) -> Self {
        Self {
            lookup,
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Failed lookups are not cached, so the next call retries.
    pub fn get(&mut self, fid: u64, now: Instant) -> Result<FarcasterProfile, String> {
        if let Some((fetched_at, profile)) = self.entries.get(&fid) {
            if now.saturating_duration_since(*fetched_at) < self.ttl {
                return Ok(profile.clone());
            }
        }

        match self.lookup.lookup(fid) {
            Ok(profile) => {
                self.entries.insert(fid, (now, profile.clone()));
                Ok(profile)
            }
            Err(err) => {
                log::warn!("[Profiles] lookup failed for fid {fid}: {err}");
                Err(err)
            }
        }
    }

    pub fn invalidate(&mut self, fid: u64) {
        self.entries.remove(&fid);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
