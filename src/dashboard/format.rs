//! Dashboard formatting helpers
//!
//! Timestamps, money and durations as the cards show them

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an API timestamp.
///
/// Accepts RFC 3339 (`2024-01-21T14:30:00Z`) and naive ISO timestamps
/// (`2024-01-21T14:30:00.123456`), which are taken as UTC.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Relative time: "Just now", "5m ago", "3h ago", "2d ago".
///
/// Unparseable timestamps are returned as-is.
pub fn format_time_ago(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_timestamp(timestamp) else {
        return timestamp.to_string();
    };
    let minutes = (now - then).num_minutes();

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    if minutes < 1440 {
        return format!("{}h ago", minutes / 60);
    }
    format!("{}d ago", minutes / 1440)
}

/// Format compact timestamp (`MM-DD HH:MM`) from a full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(parsed) => parsed.format("%m-%d %H:%M").to_string(),
        // Fallback to original timestamp if parsing fails
        None => timestamp.to_string(),
    }
}

/// Dollar amount with thousands separators; cents only when present.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, fraction) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if fraction == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, fraction)
    }
}

/// Stage durations: "3m 5s", or "-" when unknown or zero.
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        None | Some(0) => "-".to_string(),
        Some(secs) => format!("{}m {}s", secs / 60, secs % 60),
    }
}

/// Signed percentage with one decimal, e.g. "+4.4%".
pub fn format_percent_change(percent: f64) -> String {
    format!("{:+.1}%", percent)
}
