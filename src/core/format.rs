//! Formatting and parsing utilities for game data display.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use super::constants::{PRIZE_IMAGE_DIR, SPONSOR_IMAGE_DIR};

/// Layouts accepted for timestamps without an offset (read as local time)
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a countdown instant.
///
/// Accepts RFC 3339 timestamps and the naive `YYYY-MM-DDTHH:MM[:SS]` forms
/// produced by date-time pickers and `datetime.isoformat()`.
pub fn parse_countdown_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Static path of the prize image
pub fn prize_image_path(filename: &str) -> String {
    format!("{}/{}", PRIZE_IMAGE_DIR, filename)
}

/// Static path of a sponsor logo
pub fn sponsor_image_path(filename: &str) -> String {
    format!("{}/{}", SPONSOR_IMAGE_DIR, filename)
}

/// Join numbers as `1, 2, 3`
pub fn format_numbers(numbers: &[i32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
