use serde::{Deserialize, Deserializer, Serialize};

/// Moderation-level role flags carried in the SDK's opaque metadata string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMetadata {
    #[serde(default, deserialize_with = "deserialize_fid")]
    pub fid: Option<u64>,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub is_cohost: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<PeerProfile>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
}

impl PeerMetadata {
    /// Decode at the boundary. Anything malformed yields the default record
    /// (no creator, no cohost), which classifies as a plain role.
    pub fn decode(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<PeerMetadata>(trimmed) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!(
                    "[Peers] malformed peer metadata ignored: {err}; raw={}",
                    crate::shared::text::truncate_text(trimmed, 120)
                );
                Self::default()
            }
        }
    }

    pub fn encode(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn with_cohost(mut self, is_cohost: bool) -> Self {
        self.is_cohost = is_cohost;
        self
    }

    pub fn with_creator(mut self, is_creator: bool) -> Self {
        self.is_creator = is_creator;
        self
    }
}

fn deserialize_fid<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFid {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawFid>::deserialize(deserializer)? {
        Some(RawFid::Number(fid)) => Some(fid),
        Some(RawFid::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
