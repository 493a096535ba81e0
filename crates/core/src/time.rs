//! Clock display helpers.

/// Format seconds as `M:SS`; minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
