//! Fixed-width formatting of the size and modification-time columns.
//!
//! ## Sizes
//!
//! Sizes are scaled by 1024 until they drop below 1024, keeping one decimal
//! digit taken from the last remainder (`remainder / 100`, capped at 9):
//!
//! ```text
//! 0        → 0B
//! 999      → 999B
//! 1024     → 1.0K
//! 1536     → 1.5K
//! 1048576  → 1.0M
//! ```
//!
//! The integer part never exceeds three digits. A scaled value of 1000..=1023
//! does not fit, so it saturates to `0.9` of the next unit (`1000 KiB` renders
//! as `0.9M`). This is a display policy, not a rounding: the exact byte count
//! is always available next to it in the row's `val` attribute.
//!
//! ## Times
//!
//! Modification times render as `YYYY-Mon-DD HH:MM:SS` in the host's local
//! time zone, e.g. `2005-Jan-01 22:23:24`.

use chrono::{Local, TimeZone};
use std::fmt::Display;

const UNITS: &[u8; 7] = b"BKMGTPE";

const TIME_FORMAT: &str = "%Y-%b-%d %H:%M:%S";

/// Render a byte count as e.g. `512B`, `1.5K`, `23.0M`.
///
/// At most 7 characters (`999.9K` is the widest).
pub fn format_size(size: u64) -> String {
    let mut size = size;
    let mut unit = 0;
    let mut remaining = 0;

    while size >= 1024 {
        remaining = size & 1023;
        size >>= 10;
        unit += 1;
    }

    let mut decimal = (remaining / 100).min(9);
    if size > 999 {
        size = 0;
        decimal = 9;
        unit += 1;
    }

    // u64::MAX scales to 15E, and saturation only happens below E.
    let unit = UNITS[unit] as char;
    if unit == 'B' {
        format!("{size}{unit}")
    } else {
        format!("{size}.{decimal}{unit}")
    }
}

/// Render a Unix timestamp in local time.
pub fn format_time(mtime: i64) -> String {
    format_time_in(mtime, &Local)
}

/// Render a Unix timestamp in the given time zone.
///
/// Timestamps the zone cannot represent render as an empty string.
pub fn format_time_in<Tz>(mtime: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(mtime, 0)
        .earliest()
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}
