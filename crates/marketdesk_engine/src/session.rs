use crate::time::{MarketClock, TimeError};
use chrono::NaiveTime;
use std::fmt;
use std::str::FromStr;

/// Regular trading hours, 09:15 to 15:30 by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSession {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for MarketSession {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl MarketSession {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// Session open and close as Unix seconds on the clock's day.
    pub fn bounds(&self, clock: &MarketClock) -> Result<(i64, i64), TimeError> {
        Ok((clock.at(self.open)?, clock.at(self.close)?))
    }
}

/// How the chart's visible time window is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisibleRangePolicy {
    /// Always the full session, whatever the data covers.
    #[default]
    Session,
    /// The session narrowed to the data's own extent.
    ClampToData,
}

impl VisibleRangePolicy {
    /// `data_extent` is the (min, max) timestamp over all plotted series.
    ///
    /// `ClampToData` falls back to the session when the intersection is empty or a
    /// single instant.
    pub fn visible_range(&self, session: (i64, i64), data_extent: Option<(i64, i64)>) -> (i64, i64) {
        match (self, data_extent) {
            (VisibleRangePolicy::ClampToData, Some((min, max))) => {
                let from = session.0.max(min);
                let to = session.1.min(max);
                if from < to {
                    (from, to)
                } else {
                    session
                }
            }
            _ => session,
        }
    }
}

impl FromStr for VisibleRangePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(VisibleRangePolicy::Session),
            "data" | "clamp" | "clamp-to-data" => Ok(VisibleRangePolicy::ClampToData),
            other => Err(format!("unknown visible range policy {other:?}, expected session or data")),
        }
    }
}

impl fmt::Display for VisibleRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibleRangePolicy::Session => f.write_str("session"),
            VisibleRangePolicy::ClampToData => f.write_str("data"),
        }
    }
}
