use std::time::Duration;

/// Drops everything past the first decimal, the way speeds are reported.
pub fn truncate_to_tenth(value: f64) -> f64 {
    (value * 10.0).trunc() / 10.0
}

/// Words per minute for `words` typed over `elapsed`, truncated to one
/// decimal. Zero when no time has passed.
pub fn words_per_minute(words: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    truncate_to_tenth(words as f64 * 60.0 / secs)
}

/// `m:ss` with whole seconds, rounding down.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
