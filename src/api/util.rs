use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

pub(super) const READ_TIMEOUT: Duration = Duration::from_secs(10);
pub(super) const WRITE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

pub(super) fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.or(e.message))
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "no response body".to_string()
            } else {
                body.to_string()
            }
        })
}

pub(super) fn truncate_for_log(value: &str, max_chars: usize) -> String {
    crate::shared::text::truncate_text(value, max_chars)
}

pub(super) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a finished exchange to `T`, turning non-2xx statuses into the server's
/// own error text where it sent one.
pub(super) fn read_response<T: DeserializeOwned>(
    mut response: ureq::http::Response<ureq::Body>,
    action: &str,
    url: &str,
) -> Result<T, String> {
    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        let err_body = response.body_mut().read_to_string().unwrap_or_default();
        log::warn!(
            "[Rooms] {} failed: status={}, url={}, body={}",
            action,
            status,
            url,
            truncate_for_log(&err_body, 400)
        );
        let err = parse_error_message(&err_body);
        return Err(format!("{action} failed (HTTP {status}) at {url}: {err}"));
    }

    response
        .body_mut()
        .read_json()
        .map_err(|e| format!("invalid {action} response: {e}"))
}
