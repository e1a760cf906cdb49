use std::fmt::Display;

use chrono::{NaiveDate, NaiveTime};
use log::debug;

use crate::{
    ConfigError, History, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price,
    Record, SessionWindow, Timestamp,
    session::{Range, is_at},
};

const CLOSE_1459_30: NaiveTime = NaiveTime::from_hms_opt(14, 59, 30).unwrap();
const CLOSE_1515_30: NaiveTime = NaiveTime::from_hms_opt(15, 15, 30).unwrap();
const CLOSE_1559_30: NaiveTime = NaiveTime::from_hms_opt(15, 59, 30).unwrap();

/// Configuration for the prior session ([`PriorRth`]) indicator.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct PriorRthConfig {
    window: SessionWindow,
}

impl IndicatorConfig for PriorRthConfig {
    type Builder = PriorRthConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        PriorRthConfigBuilder {
            start: (8, 30),
            end: (16, 0),
        }
    }

    #[inline]
    fn start(&self) -> NaiveTime {
        self.window.start()
    }
}

impl PriorRthConfig {
    #[must_use]
    pub fn new(window: SessionWindow) -> Self {
        Self { window }
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &SessionWindow {
        &self.window
    }
}

impl Display for PriorRthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PriorRthConfig({})", self.window)
    }
}

/// Builder for [`PriorRthConfig`].
///
/// Defaults: 08:30-16:00.
pub struct PriorRthConfigBuilder {
    start: (u32, u32),
    end: (u32, u32),
}

impl PriorRthConfigBuilder {
    /// Sets the session end clock time.
    #[inline]
    #[must_use]
    pub fn end(mut self, hour: u32, minute: u32) -> Self {
        self.end = (hour, minute);
        self
    }
}

impl IndicatorConfigBuilder<PriorRthConfig> for PriorRthConfigBuilder {
    #[inline]
    fn start(mut self, hour: u32, minute: u32) -> Self {
        self.start = (hour, minute);
        self
    }

    fn build(self) -> Result<PriorRthConfig, ConfigError> {
        Ok(PriorRthConfig {
            window: SessionWindow::from_hm(self.start.0, self.start.1, self.end.0, self.end.1)?,
        })
    }
}

/// Statistics of the previous day's session.
///
/// Every field is independent: a prior day may have session bars but no
/// bar at one of the snapshot times, or no session bars at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriorRthValue {
    high: Option<Price>,
    low: Option<Price>,
    mid: Option<Price>,
    boundary_close: Option<Price>,
    close_1459_30: Option<Price>,
    close_1515_30: Option<Price>,
    close_1559_30: Option<Price>,
}

impl PriorRthValue {
    #[inline]
    #[must_use]
    pub fn high(&self) -> Option<Price> {
        self.high
    }

    #[inline]
    #[must_use]
    pub fn low(&self) -> Option<Price> {
        self.low
    }

    /// `(high + low) / 2`.
    #[inline]
    #[must_use]
    pub fn mid(&self) -> Option<Price> {
        self.mid
    }

    /// Close of the out-of-session bar that ended the lookback: the last bar
    /// before the prior session began. `None` if the scan reached the start
    /// of history first.
    #[inline]
    #[must_use]
    pub fn boundary_close(&self) -> Option<Price> {
        self.boundary_close
    }

    /// Close of the prior day's `14:59:30` bar.
    #[inline]
    #[must_use]
    pub fn close_1459_30(&self) -> Option<Price> {
        self.close_1459_30
    }

    /// Close of the prior day's `15:15:30` bar.
    #[inline]
    #[must_use]
    pub fn close_1515_30(&self) -> Option<Price> {
        self.close_1515_30
    }

    /// Close of the prior day's `15:59:30` bar.
    #[inline]
    #[must_use]
    pub fn close_1559_30(&self) -> Option<Price> {
        self.close_1559_30
    }
}

impl From<PriorRthValue> for Record {
    fn from(value: PriorRthValue) -> Self {
        Record::with_capacity(6)
            .with("prevRTHHigh", value.high)
            .with("prevRTHLow", value.low)
            .with("prevRTHMid", value.mid)
            .with("pRTHClose15", value.close_1459_30)
            .with("pRTHClose1515", value.close_1515_30)
            .with("pRTHClose1559", value.close_1559_30)
    }
}

/// Prior regular trading hours session (pRTH).
///
/// On the first bar of each calendar day, scans history backward from the
/// current bar and recovers the previous day's session high, low and mid,
/// plus the closes at `14:59:30`, `15:15:30` and `15:59:30`. The result is
/// held for the rest of the day.
///
/// The scan skips bars of the current date. Bars whose hour is in
/// `[start.hour, end.hour)` extend the range. Once a session bar has been
/// seen, the first earlier bar outside the session ends the scan. This costs
/// one day of bars at the rollover bar and O(1) otherwise.
///
/// This is the only indicator that needs random access to history.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{PriorRth, PriorRthConfig};
/// # use quantedge_sessions::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, &'static str);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn timestamp(&self) -> Timestamp {
/// #         Timestamp::parse_from_str(self.1, "%Y-%m-%d %H:%M:%S").unwrap()
/// #     }
/// # }
///
/// let bars = vec![
///     Bar(100.0, "2024-03-04 07:00:00"),
///     Bar(104.0, "2024-03-04 09:00:00"),
///     Bar(98.0, "2024-03-04 14:59:30"),
///     Bar(101.0, "2024-03-05 07:00:00"),
/// ];
/// let mut prth = PriorRth::new(PriorRthConfig::default());
/// for (i, bar) in bars.iter().enumerate() {
///     prth.compute(bar, i, &bars);
/// }
///
/// let value = prth.value();
/// assert_eq!(value.high(), Some(104.0));
/// assert_eq!(value.low(), Some(98.0));
/// assert_eq!(value.mid(), Some(101.0));
/// assert_eq!(value.close_1459_30(), Some(98.0));
/// assert_eq!(value.close_1515_30(), None);
/// ```
#[derive(Clone, Debug)]
pub struct PriorRth {
    config: PriorRthConfig,
    last_date: Option<NaiveDate>,
    last_timestamp: Option<Timestamp>,
    current: PriorRthValue,
}

impl PriorRth {
    fn scan<H>(&self, date: NaiveDate, index: usize, history: &H) -> PriorRthValue
    where
        H: History + ?Sized,
    {
        let window = self.config.window;
        let mut value = PriorRthValue::default();
        let mut range: Option<Range> = None;
        let mut scanned = 0_usize;

        for past in (0..=index).rev().filter_map(|j| history.get(j)) {
            let ts = past.timestamp();
            if ts.date() == date {
                continue;
            }
            scanned += 1;

            let in_session = window.contains_hour(&ts);
            if in_session {
                range = Some(Range::include(range, past));
            }

            if is_at(&ts, CLOSE_1459_30) {
                value.close_1459_30 = Some(past.close());
            } else if is_at(&ts, CLOSE_1515_30) {
                value.close_1515_30 = Some(past.close());
            } else if is_at(&ts, CLOSE_1559_30) {
                value.close_1559_30 = Some(past.close());
            }

            if range.is_some() && !in_session {
                value.boundary_close = Some(past.close());
                break;
            }
        }

        value.high = range.map(|r| r.high);
        value.low = range.map(|r| r.low);
        value.mid = range.map(|r| r.mid());

        debug!("{self}: scanned {scanned} bars before {date}, range {range:?}");

        value
    }
}

impl Indicator for PriorRth {
    type Config = PriorRthConfig;
    type Output = PriorRthValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            last_date: None,
            last_timestamp: None,
            current: PriorRthValue::default(),
        }
    }

    #[inline]
    fn config(&self) -> &PriorRthConfig {
        &self.config
    }

    fn compute<H>(&mut self, bar: &H::Bar, index: usize, history: &H) -> PriorRthValue
    where
        H: History + ?Sized,
    {
        let ts = bar.timestamp();
        debug_assert!(
            self.last_timestamp.is_none_or(|last| last <= ts),
            "timestamp must be non-decreasing: last={:?}, got={ts}",
            self.last_timestamp,
        );
        self.last_timestamp = Some(ts);

        let date = ts.date();
        if self.last_date != Some(date) {
            self.last_date = Some(date);
            self.current = self.scan(date, index, history);
        }

        self.current
    }

    #[inline]
    fn value(&self) -> PriorRthValue {
        self.current
    }
}

impl Display for PriorRth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pRTH({})", self.config.window)
    }
}
