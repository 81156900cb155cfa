//! Wall-clock timestamps for scrambles and session logs.
//!
//! A timestamp's text form feeds into the scramble RNG, so it is fixed at
//! RFC 3339 in UTC with millisecond precision, such as
//! `2025-01-01T12:34:56.789Z`.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp, truncated to milliseconds when taken from the clock.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        write!(f, "{s}")
    }
}
impl std::str::FromStr for Timestamp {
    type Err = chrono::ParseError;

    /// Parses an RFC 3339 timestamp with any UTC offset.
    fn from_str(s: &str) -> chrono::ParseResult<Self> {
        let t = DateTime::parse_from_rfc3339(s.trim())?;
        Ok(Self(t.with_timezone(&Utc)))
    }
}
impl Timestamp {
    /// Returns the current time.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    /// Returns the number of milliseconds from `earlier` to `self`, which is
    /// negative if `earlier` is actually later.
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).num_milliseconds()
    }

    /// Returns the timestamp in a form that can be used in a file name on
    /// any platform, such as `2025-01-01T12-34-56.789Z`.
    pub fn file_stem(self) -> String {
        self.0.format("%Y-%m-%dT%H-%M-%S%.3fZ").to_string()
    }
}
