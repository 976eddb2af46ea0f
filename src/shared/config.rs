use std::env;
use std::path::PathBuf;

pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn rooms_backend_base_url() -> Result<String, String> {
    non_empty_env("ROOMS_API_URL")
        .or_else(|| non_empty_env("FRAME_ROOMS_BACKEND_URL"))
        .ok_or_else(|| {
            "Missing rooms backend URL. Set ROOMS_API_URL (legacy: FRAME_ROOMS_BACKEND_URL)."
                .to_string()
        })
}

pub fn frame_fid() -> Option<u64> {
    non_empty_env("FRAME_FID").and_then(|v| v.trim().parse().ok())
}

pub fn frame_wallet_address() -> Option<String> {
    non_empty_env("FRAME_WALLET_ADDRESS").map(|v| v.trim().to_ascii_lowercase())
}

pub fn rooms_data_dir() -> PathBuf {
    non_empty_env("ROOMS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("frame-rooms")
        })
}

/// Public base URL of the frame, used when sharing a room link.
pub fn frame_app_url() -> Option<String> {
    non_empty_env("FRAME_APP_URL").map(|v| v.trim().trim_end_matches('/').to_string())
}
