use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a run name as `YYYYMMDD-HHMMSS-<label>` in UTC.
pub fn format_run_name(now: DateTime<Utc>, label: &str) -> String {
    format!("{}-{label}", now.format("%Y%m%d-%H%M%S"))
}

pub fn format_rfc3339_utc(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}
