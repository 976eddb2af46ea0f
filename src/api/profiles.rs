use serde::Deserialize;

use crate::profiles::{FarcasterProfile, ProfileLookup};

use super::util::{join_url, read_response, READ_TIMEOUT};

#[derive(Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<NeynarUser>,
}

#[derive(Deserialize)]
struct NeynarUser {
    fid: u64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    pfp_url: Option<String>,
    #[serde(default)]
    profile: Option<NeynarProfileBody>,
}

#[derive(Deserialize)]
struct NeynarProfileBody {
    #[serde(default)]
    bio: Option<NeynarBio>,
}

#[derive(Deserialize)]
struct NeynarBio {
    #[serde(default)]
    text: Option<String>,
}

impl From<NeynarUser> for FarcasterProfile {
    fn from(user: NeynarUser) -> Self {
        FarcasterProfile {
            fid: user.fid,
            username: user.username,
            display_name: user.display_name,
            pfp_url: user.pfp_url,
            bio: user.profile.and_then(|p| p.bio).and_then(|b| b.text),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NeynarProfileClient {
    base_url: String,
    api_key: String,
}

impl NeynarProfileClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl ProfileLookup for NeynarProfileClient {
    fn lookup(&self, fid: u64) -> Result<FarcasterProfile, String> {
        let url = join_url(&self.base_url, "/v2/farcaster/user/bulk");
        let response = ureq::get(&url)
            .config()
            .http_status_as_error(false)
            .timeout_global(Some(READ_TIMEOUT))
            .build()
            .query("fids", fid.to_string())
            .header("x-api-key", &self.api_key)
            .call()
            .map_err(|e| format!("profile lookup request failed: {e}"))?;

        let body: BulkUsersResponse = read_response(response, "profile lookup", &url)?;
        body.users
            .into_iter()
            .find(|user| user.fid == fid)
            .map(FarcasterProfile::from)
            .ok_or_else(|| format!("no profile found for fid {fid}"))
    }
}
