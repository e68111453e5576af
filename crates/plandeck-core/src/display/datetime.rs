//! Date/time display utilities.
//!
//! Timestamps are stored in UTC and rendered in the system timezone.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// A wrapper around `Timestamp` that formats it in the system timezone.
///
/// The display format follows the pattern: `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl<'a> fmt::Display for LocalDateTime<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// When a plan last heard from the server, or `never`.
///
/// ```rust
/// use plandeck_core::display::LastSync;
///
/// assert_eq!(LastSync(None).to_string(), "never");
/// ```
pub struct LastSync<'a>(pub Option<&'a Timestamp>);

impl<'a> fmt::Display for LastSync<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ts) => write!(f, "{}", LocalDateTime(ts)),
            None => write!(f, "never"),
        }
    }
}
