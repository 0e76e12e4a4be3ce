use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("expected HH:MM, got {0:?}")]
    Malformed(String),
    #[error("{0:?} is outside 00:00-23:59")]
    OutOfRange(String),
    #[error("{time} does not exist on {day} in {tz}")]
    NonexistentLocalTime {
        time: NaiveTime,
        day: NaiveDate,
        tz: String,
    },
}

/// Parses a 24-hour `HH:MM` market time. A trailing `:SS` part is ignored.
pub fn parse_market_time(input: &str) -> Result<NaiveTime, TimeError> {
    let malformed = || TimeError::Malformed(input.to_string());

    let mut parts = input.trim().split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let hours: u32 = hours.trim().parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| malformed())?;

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| TimeError::OutOfRange(input.to_string()))
}

/// A calendar day pinned in the market's time zone.
///
/// Every market-time string of one refresh cycle is resolved against the same day, so
/// the conversion stays a pure function of (day, zone, input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketClock {
    day: NaiveDate,
    tz: Tz,
}

impl MarketClock {
    pub fn new(day: NaiveDate, tz: Tz) -> Self {
        Self { day, tz }
    }

    pub fn today(tz: Tz) -> Self {
        Self::new(Utc::now().with_timezone(&tz).date_naive(), tz)
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Unix seconds of `time` on the pinned day. Ambiguous local times resolve to the
    /// earliest instant.
    pub fn at(&self, time: NaiveTime) -> Result<i64, TimeError> {
        self.tz
            .from_local_datetime(&self.day.and_time(time))
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| TimeError::NonexistentLocalTime {
                time,
                day: self.day,
                tz: self.tz.name().to_string(),
            })
    }

    /// Unix seconds of an `HH:MM` string on the pinned day.
    pub fn timestamp(&self, input: &str) -> Result<i64, TimeError> {
        self.at(parse_market_time(input)?)
    }

    /// `HH:MM` of a Unix timestamp in the market zone.
    pub fn format_hhmm(&self, timestamp: i64) -> String {
        DateTime::from_timestamp(timestamp, 0)
            .map(|dt| dt.with_timezone(&self.tz).format("%H:%M").to_string())
            .unwrap_or_default()
    }

    /// Seconds the market zone is ahead of UTC at `timestamp`.
    pub fn utc_offset_secs(&self, timestamp: i64) -> i64 {
        DateTime::from_timestamp(timestamp, 0)
            .map(|dt| i64::from(dt.with_timezone(&self.tz).offset().fix().local_minus_utc()))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kolkata() -> MarketClock {
        MarketClock::new(NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(), chrono_tz::Asia::Kolkata)
    }

    #[test]
    fn parses_market_times() {
        assert_eq!(parse_market_time("09:20"), Ok(NaiveTime::from_hms_opt(9, 20, 0).unwrap()));
        assert_eq!(parse_market_time(" 9:05 "), Ok(NaiveTime::from_hms_opt(9, 5, 0).unwrap()));
        assert_eq!(parse_market_time("15:30:59"), Ok(NaiveTime::from_hms_opt(15, 30, 0).unwrap()));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_market_time("0920"), Err(TimeError::Malformed(_))));
        assert!(matches!(parse_market_time("ab:cd"), Err(TimeError::Malformed(_))));
        assert!(matches!(parse_market_time(""), Err(TimeError::Malformed(_))));
        assert!(matches!(parse_market_time("24:00"), Err(TimeError::OutOfRange(_))));
        assert!(matches!(parse_market_time("09:60"), Err(TimeError::OutOfRange(_))));
    }

    #[test]
    fn anchors_to_pinned_day() {
        let clock = kolkata();
        let expected = Utc.with_ymd_and_hms(2025, 8, 14, 3, 50, 0).unwrap().timestamp();

        assert_eq!(clock.timestamp("09:20"), Ok(expected));
        assert_eq!(clock.timestamp("09:20"), clock.timestamp("09:20"));
        assert_eq!(clock.timestamp("09:25").unwrap() - clock.timestamp("09:20").unwrap(), 300);
    }

    #[test]
    fn seconds_component_is_zero() {
        let ts = kolkata().timestamp("10:01").unwrap();
        assert_eq!(ts % 60, 0);
    }

    #[test]
    fn formats_in_market_zone() {
        let clock = kolkata();
        let ts = clock.timestamp("14:45").unwrap();
        assert_eq!(clock.format_hhmm(ts), "14:45");
    }

    #[test]
    fn kolkata_offset() {
        let clock = kolkata();
        let ts = clock.timestamp("09:15").unwrap();
        assert_eq!(clock.utc_offset_secs(ts), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn dst_gap_is_an_error() {
        let clock = MarketClock::new(
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            chrono_tz::America::New_York,
        );
        assert!(matches!(
            clock.timestamp("02:30"),
            Err(TimeError::NonexistentLocalTime { .. })
        ));
    }
}
