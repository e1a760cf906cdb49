use crate::{ConfigError, Ohlcv, Price, Timestamp};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::fmt::Display;

/// Builds a session clock time from host parameters.
///
/// Seconds are always zero: sessions are configured to the minute.
pub(crate) fn session_time(hour: u32, minute: u32) -> Result<NaiveTime, ConfigError> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ConfigError::InvalidTime { hour, minute })
}

/// Builds a session end clock time. `24:00` is the end of the day and is
/// returned as `None`.
fn session_end(hour: u32, minute: u32) -> Result<Option<NaiveTime>, ConfigError> {
    if (hour, minute) == (24, 0) {
        Ok(None)
    } else {
        session_time(hour, minute).map(Some)
    }
}

/// Exact wall-clock match to the second. Sub-second parts are ignored.
#[inline]
pub(crate) fn is_at(ts: &Timestamp, time: NaiveTime) -> bool {
    ts.hour() == time.hour() && ts.minute() == time.minute() && ts.second() == time.second()
}

/// Clock-bounded session window, `[start, end)` within one calendar day.
///
/// Windows never wrap midnight; `start` must be strictly before `end`. An
/// end of `24:00` closes the window at the following midnight.
///
/// # Example
///
/// ```
/// use quantedge_sessions::SessionWindow;
///
/// let rth = SessionWindow::from_hm(8, 30, 16, 0).unwrap();
/// assert_eq!(rth.to_string(), "08:30-16:00");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SessionWindow {
    start: NaiveTime,
    end: NaiveTime,
    end_of_day: bool,
}

impl SessionWindow {
    /// Creates a window from clock times.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyWindow`] if `start >= end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ConfigError> {
        if start >= end {
            return Err(ConfigError::EmptyWindow { start, end });
        }
        Ok(Self {
            start,
            end,
            end_of_day: false,
        })
    }

    /// Creates a window from `start` to the end of the day (`24:00`).
    #[must_use]
    pub fn until_midnight(start: NaiveTime) -> Self {
        Self {
            start,
            end: NaiveTime::MIN,
            end_of_day: true,
        }
    }

    /// Creates a window from hour and minute components.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidTime`] for an out-of-range hour or minute,
    /// [`ConfigError::EmptyWindow`] if start is not before end. The end may
    /// be `24:00`.
    pub fn from_hm(
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
    ) -> Result<Self, ConfigError> {
        let start = session_time(start_hour, start_minute)?;
        match session_end(end_hour, end_minute)? {
            Some(end) => Self::new(start, end),
            None => Ok(Self::until_midnight(start)),
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// End clock time. `00:00` when the window runs to midnight.
    #[inline]
    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the window closes at the end of the day (`24:00`).
    #[inline]
    #[must_use]
    pub fn ends_at_midnight(&self) -> bool {
        self.end_of_day
    }

    fn end_hour(&self) -> u32 {
        if self.end_of_day { 24 } else { self.end.hour() }
    }

    /// Hour-granular membership: `start.hour <= ts.hour < end.hour`.
    ///
    /// Minutes are ignored on both edges. With an 08:30-16:00 window a bar
    /// at 08:05 is inside and a bar at 16:00 is outside.
    #[inline]
    #[must_use]
    pub fn contains_hour(&self, ts: &Timestamp) -> bool {
        let hour = ts.hour();
        self.start.hour() <= hour && hour < self.end_hour()
    }

    /// Session start and end instants on `date`. A `24:00` end falls on the
    /// next day's midnight.
    #[inline]
    #[must_use]
    pub fn bounds_on(&self, date: NaiveDate) -> (Timestamp, Timestamp) {
        let end = if self.end_of_day {
            date.and_time(NaiveTime::MIN)
                .checked_add_signed(TimeDelta::days(1))
                .unwrap_or(NaiveDateTime::MAX)
        } else {
            date.and_time(self.end)
        };
        (date.and_time(self.start), end)
    }

    /// Exact membership: `session_start <= ts < session_end` on the bar's
    /// own calendar date.
    #[inline]
    #[must_use]
    pub fn contains(&self, ts: &Timestamp) -> bool {
        let (start, end) = self.bounds_on(ts.date());
        start <= *ts && *ts < end
    }

    /// True when `ts` falls exactly on the window start, to the second.
    #[inline]
    #[must_use]
    pub fn is_start(&self, ts: &Timestamp) -> bool {
        is_at(ts, self.start)
    }
}

impl Default for SessionWindow {
    /// 08:30-16:00.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            end_of_day: false,
        }
    }
}

impl Display for SessionWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.end_of_day {
            write!(f, "{}-24:00", self.start.format("%H:%M"))
        } else {
            write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
        }
    }
}

/// Running high/low of a session.
///
/// Stored as `Option<Range>`: `None` is the untouched state, so there is no
/// infinite sentinel to mask at the output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Range {
    pub(crate) high: Price,
    pub(crate) low: Price,
}

impl Range {
    #[inline]
    pub(crate) fn of(bar: &impl Ohlcv) -> Self {
        Self {
            high: bar.high(),
            low: bar.low(),
        }
    }

    #[inline]
    pub(crate) fn extend(&mut self, bar: &impl Ohlcv) {
        self.high = self.high.max(bar.high());
        self.low = self.low.min(bar.low());
    }

    /// Extends `range` with `bar`, starting a new range if there is none.
    #[inline]
    pub(crate) fn include(range: Option<Self>, bar: &impl Ohlcv) -> Self {
        match range {
            Some(mut range) => {
                range.extend(bar);
                range
            }
            None => Self::of(bar),
        }
    }

    #[inline]
    pub(crate) fn width(&self) -> Price {
        self.high - self.low
    }

    #[inline]
    pub(crate) fn mid(&self) -> Price {
        f64::midpoint(self.high, self.low)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{Bar, at};

    fn rth() -> SessionWindow {
        SessionWindow::from_hm(8, 30, 16, 0).unwrap()
    }

    mod window {
        use super::*;

        #[test]
        fn rejects_out_of_range_hour() {
            assert_eq!(
                SessionWindow::from_hm(24, 0, 16, 0),
                Err(ConfigError::InvalidTime {
                    hour: 24,
                    minute: 0
                })
            );
        }

        #[test]
        fn rejects_out_of_range_minute() {
            assert!(matches!(
                SessionWindow::from_hm(8, 60, 16, 0),
                Err(ConfigError::InvalidTime { minute: 60, .. })
            ));
        }

        #[test]
        fn rejects_empty_window() {
            assert!(matches!(
                SessionWindow::from_hm(16, 0, 8, 30),
                Err(ConfigError::EmptyWindow { .. })
            ));
            assert!(matches!(
                SessionWindow::from_hm(9, 0, 9, 0),
                Err(ConfigError::EmptyWindow { .. })
            ));
        }

        #[test]
        fn accepts_midnight_end() {
            let w = SessionWindow::from_hm(17, 0, 24, 0).unwrap();
            assert!(w.ends_at_midnight());
            assert_eq!(w.to_string(), "17:00-24:00");
            assert_eq!(
                w,
                SessionWindow::until_midnight(NaiveTime::from_hms_opt(17, 0, 0).unwrap())
            );
        }

        #[test]
        fn rejects_past_midnight_end() {
            assert_eq!(
                SessionWindow::from_hm(17, 0, 24, 30),
                Err(ConfigError::InvalidTime {
                    hour: 24,
                    minute: 30
                })
            );
        }

        #[test]
        fn default_is_regular_hours() {
            assert_eq!(SessionWindow::default(), rth());
        }

        #[test]
        fn display() {
            assert_eq!(rth().to_string(), "08:30-16:00");
        }
    }

    mod membership {
        use super::*;

        #[test]
        fn contains_hour_ignores_minutes() {
            let w = rth();
            assert!(w.contains_hour(&at("2024-03-04 08:05:00")));
            assert!(w.contains_hour(&at("2024-03-04 15:59:30")));
            assert!(!w.contains_hour(&at("2024-03-04 16:00:00")));
            assert!(!w.contains_hour(&at("2024-03-04 07:59:59")));
        }

        #[test]
        fn contains_is_exact() {
            let w = rth();
            assert!(!w.contains(&at("2024-03-04 08:29:59")));
            assert!(w.contains(&at("2024-03-04 08:30:00")));
            assert!(w.contains(&at("2024-03-04 15:59:59")));
            assert!(!w.contains(&at("2024-03-04 16:00:00")));
        }

        #[test]
        fn bounds_on_date() {
            let (start, end) = rth().bounds_on(at("2024-03-04 12:00:00").date());
            assert_eq!(start, at("2024-03-04 08:30:00"));
            assert_eq!(end, at("2024-03-04 16:00:00"));
        }

        #[test]
        fn midnight_end_covers_last_hour() {
            let w = SessionWindow::from_hm(17, 0, 24, 0).unwrap();
            assert!(w.contains_hour(&at("2024-03-04 23:59:30")));
            assert!(!w.contains_hour(&at("2024-03-04 16:59:59")));
            assert!(!w.contains_hour(&at("2024-03-05 00:00:00")));

            assert!(w.contains(&at("2024-03-04 23:59:59")));
            assert!(!w.contains(&at("2024-03-05 00:00:00")));

            let (_, end) = w.bounds_on(at("2024-03-04 12:00:00").date());
            assert_eq!(end, at("2024-03-05 00:00:00"));
        }

        #[test]
        fn is_start_matches_to_the_second() {
            let w = rth();
            assert!(w.is_start(&at("2024-03-05 08:30:00")));
            assert!(!w.is_start(&at("2024-03-05 08:30:01")));
            assert!(!w.is_start(&at("2024-03-05 08:29:59")));
        }
    }

    mod range {
        use super::*;

        #[test]
        fn include_starts_from_first_bar() {
            let r = Range::include(None, &Bar::new(10.0, 12.0, 9.0, 11.0));
            assert_eq!(r, Range { high: 12.0, low: 9.0 });
        }

        #[test]
        fn include_widens_existing_range() {
            let r = Range::include(None, &Bar::new(10.0, 12.0, 9.0, 11.0));
            let r = Range::include(Some(r), &Bar::new(11.0, 15.0, 10.0, 14.0));
            let r = Range::include(Some(r), &Bar::new(11.0, 13.0, 7.0, 8.0));
            assert_eq!(r, Range { high: 15.0, low: 7.0 });
            assert_eq!(r.width(), 8.0);
            assert_eq!(r.mid(), 11.0);
        }
    }
}
