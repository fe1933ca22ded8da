//! Human-readable labels for sizes, play time and recency.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

pub fn format_size(bytes: u64) -> String {
    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        _ => format!("{bytes} B"),
    }
}

pub fn format_play_time(seconds: u64) -> String {
    if seconds == 0 {
        return "Never played".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// `timestamp` and `now` are unix seconds; `timestamp == 0` means never.
pub fn format_last_played(timestamp: u64, now: u64) -> String {
    if timestamp == 0 {
        return "Never".to_string();
    }

    let hours = now.saturating_sub(timestamp) / 3600;
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}
