/// Renders a second count as a zero-padded `MM:SS` clock.
///
/// Minutes are not wrapped into hours, so 90 minutes reads `90:00`.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Human-readable reading time, e.g. `2h 30m` or `45m`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
