//! Identity/wallet provider boundary and the desktop adapter for it.

use std::time::Instant;

use crate::lifecycle::LocalIdentity;
use crate::profiles::{ProfileCache, ProfileLookup};
use crate::shared::config;

const WARPCAST_BASE_URL: &str = "https://warpcast.com";

pub trait IdentityProvider {
    fn fid(&self) -> Option<u64>;
    fn wallet_address(&self) -> Option<String>;
    fn view_profile(&self, fid: u64) -> Result<(), String>;
    fn open_url(&self, url: &str) -> Result<(), String>;
    fn compose_cast(&self, text: &str, embeds: &[String]) -> Result<(), String>;
}

/// Desktop stand-in for the frame host: identity from the environment,
/// actions opened in the system browser.
#[derive(Clone, Debug, Default)]
pub struct DesktopIdentity {
    fid: Option<u64>,
    address: Option<String>,
}

impl DesktopIdentity {
    pub fn new(fid: Option<u64>, address: Option<String>) -> Self {
        Self { fid, address }
    }

    pub fn from_env() -> Self {
        Self::new(config::frame_fid(), config::frame_wallet_address())
    }
}

impl IdentityProvider for DesktopIdentity {
    fn fid(&self) -> Option<u64> {
        self.fid
    }

    fn wallet_address(&self) -> Option<String> {
        self.address.clone()
    }

    fn view_profile(&self, fid: u64) -> Result<(), String> {
        self.open_url(&profile_url(fid))
    }

    fn open_url(&self, url: &str) -> Result<(), String> {
        log::info!("[Identity] opening {url}");
        open::that(url).map_err(|e| format!("Failed to open browser: {e}"))
    }

    fn compose_cast(&self, text: &str, embeds: &[String]) -> Result<(), String> {
        self.open_url(&compose_url(text, embeds))
    }
}

pub fn profile_url(fid: u64) -> String {
    format!("{WARPCAST_BASE_URL}/~/profiles/{fid}")
}

pub fn compose_url(text: &str, embeds: &[String]) -> String {
    let mut url = format!(
        "{WARPCAST_BASE_URL}/~/compose?text={}",
        urlencoding::encode(text)
    );
    for embed in embeds {
        url.push_str("&embeds[]=");
        url.push_str(&urlencoding::encode(embed));
    }
    url
}

pub fn room_share_url(base_url: &str, room_id: &str) -> String {
    format!(
        "{}/rooms/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(room_id)
    )
}

/// Opens a cast composer with the room link embedded.
pub fn share_room<P: IdentityProvider + ?Sized>(
    provider: &P,
    room_id: &str,
    title: Option<&str>,
) -> Result<(), String> {
    let base = config::frame_app_url()
        .ok_or_else(|| "Missing FRAME_APP_URL; cannot build a room link.".to_string())?;
    let text = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("Join me in \"{title}\" live now"),
        None => "Join me in my audio room, live now".to_string(),
    };
    provider.compose_cast(&text, &[room_share_url(&base, room_id)])
}

/// Resolves the local identity, enriching it with a cached profile when the
/// lookup succeeds. A failed lookup still yields a usable identity.
pub fn resolve_local_identity<P, L>(
    provider: &P,
    profiles: &mut ProfileCache<L>,
    now: Instant,
) -> LocalIdentity
where
    P: IdentityProvider + ?Sized,
    L: ProfileLookup,
{
    let fid = provider.fid();
    let profile = fid.and_then(|fid| match profiles.get(fid, now) {
        Ok(profile) => Some(profile.to_peer_profile()),
        Err(err) => {
            log::warn!("[Profiles] lookup for fid {fid} failed: {err}");
            None
        }
    });
    LocalIdentity {
        fid,
        address: provider.wallet_address(),
        profile,
    }
}
