/// Formats a remaining duration in seconds as `HH:MM:SS`, or `MM:SS` when it
/// is shorter than an hour.
pub fn format_eta(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Shortens a verification URL for display by dropping its scheme.
pub fn display_url(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}
