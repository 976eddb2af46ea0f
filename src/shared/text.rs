pub fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

/// Abbreviate a hex address as 0x1234...abcd for compact display.
pub fn abbreviate_address(addr: &str) -> String {
    if addr.len() > 10 && addr.is_ascii() {
        format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
    } else {
        addr.to_string()
    }
}

pub fn short_room_id(room_id: &str) -> String {
    if room_id.chars().count() > 10 {
        let head: String = room_id.chars().take(8).collect();
        format!("{head}…")
    } else {
        room_id.to_string()
    }
}

/// `m:ss` below an hour, `h:mm:ss` above.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds / 60) % 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}
