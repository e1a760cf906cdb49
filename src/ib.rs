use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use chrono::{NaiveTime, TimeDelta};
use log::debug;

use crate::{
    ConfigError, History, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price,
    Record, Timestamp,
    session::{Range, is_at, session_time},
};

/// Extension distance as a percentage of the initial balance range.
///
/// Wraps a positive, finite `f64`. Implements `Eq` and `Hash` via bit-level
/// comparison, which is safe because NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct Percent(f64);

impl Percent {
    /// # Errors
    ///
    /// [`ConfigError::InvalidExtension`] if `value` is zero, negative, or
    /// not finite.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidExtension(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    fn of(self, amount: Price) -> Price {
        amount * self.0 / 100.0
    }
}

impl PartialEq for Percent {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Percent {}

impl Hash for Percent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Configuration for the Initial Balance ([`Ib`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{IbConfig, IndicatorConfig, IndicatorConfigBuilder};
///
/// let config = IbConfig::builder()
///     .start(9, 30)
///     .duration_minutes(30.0)
///     .extensions(25.0, 50.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.to_string(), "IbConfig(09:30, 30m, 25%, 50%)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct IbConfig {
    start: NaiveTime,
    duration: TimeDelta,
    first_extension: Percent,
    second_extension: Percent,
    extensions: bool,
}

impl IndicatorConfig for IbConfig {
    type Builder = IbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        IbConfigBuilder::new()
    }

    #[inline]
    fn start(&self) -> NaiveTime {
        self.start
    }
}

impl IbConfig {
    /// Length of the opening window.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn first_extension(&self) -> Percent {
        self.first_extension
    }

    #[inline]
    #[must_use]
    pub fn second_extension(&self) -> Percent {
        self.second_extension
    }

    /// Whether extension levels are computed.
    #[inline]
    #[must_use]
    pub fn extensions_enabled(&self) -> bool {
        self.extensions
    }
}

impl Default for IbConfig {
    /// 08:30 start, 60 minutes, extensions at 50% and 100%.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            duration: TimeDelta::minutes(60),
            first_extension: Percent(50.0),
            second_extension: Percent(100.0),
            extensions: true,
        }
    }
}

impl Display for IbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[allow(clippy::cast_precision_loss)]
        let minutes = self.duration.num_milliseconds() as f64 / 60_000.0;
        write!(
            f,
            "IbConfig({}, {minutes}m, {}, {})",
            self.start.format("%H:%M"),
            self.first_extension,
            self.second_extension
        )
    }
}

/// Builder for [`IbConfig`].
///
/// Defaults: start = 08:30, duration = 60 minutes, extensions at 50% and
/// 100%, extensions enabled.
pub struct IbConfigBuilder {
    start_hour: u32,
    start_minute: u32,
    duration_minutes: f64,
    first_extension: f64,
    second_extension: f64,
    extensions: bool,
}

impl IbConfigBuilder {
    fn new() -> Self {
        Self {
            start_hour: 8,
            start_minute: 30,
            duration_minutes: 60.0,
            first_extension: 50.0,
            second_extension: 100.0,
            extensions: true,
        }
    }

    /// Opening window length in minutes. Fractions are kept to the
    /// millisecond.
    #[inline]
    #[must_use]
    pub fn duration_minutes(mut self, minutes: f64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Extension distances, in percent of the IB range.
    #[inline]
    #[must_use]
    pub fn extensions(mut self, first: f64, second: f64) -> Self {
        self.first_extension = first;
        self.second_extension = second;
        self
    }

    #[inline]
    #[must_use]
    pub fn enable_extensions(mut self, enabled: bool) -> Self {
        self.extensions = enabled;
        self
    }

    fn duration(&self) -> Result<TimeDelta, ConfigError> {
        let minutes = self.duration_minutes;
        if !(minutes.is_finite() && minutes > 0.0) {
            return Err(ConfigError::InvalidDuration(minutes));
        }

        // saturates for absurdly long windows
        #[allow(clippy::cast_possible_truncation)]
        let millis = (minutes * 60_000.0).round() as i64;
        if millis == 0 {
            return Err(ConfigError::InvalidDuration(minutes));
        }

        TimeDelta::try_milliseconds(millis).ok_or(ConfigError::InvalidDuration(minutes))
    }
}

impl IndicatorConfigBuilder<IbConfig> for IbConfigBuilder {
    #[inline]
    fn start(mut self, hour: u32, minute: u32) -> Self {
        self.start_hour = hour;
        self.start_minute = minute;
        self
    }

    fn build(self) -> Result<IbConfig, ConfigError> {
        Ok(IbConfig {
            start: session_time(self.start_hour, self.start_minute)?,
            duration: self.duration()?,
            first_extension: Percent::new(self.first_extension)?,
            second_extension: Percent::new(self.second_extension)?,
            extensions: self.extensions,
        })
    }
}

/// Extension levels projected from the initial balance range.
///
/// ```text
/// up1   = high + range × first%
/// up2   = high + range × second%
/// down1 = low  − range × first%
/// down2 = low  − range × second%
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IbExtensions {
    up1: Price,
    up2: Price,
    down1: Price,
    down2: Price,
}

impl IbExtensions {
    #[inline]
    #[must_use]
    pub fn up1(&self) -> Price {
        self.up1
    }

    #[inline]
    #[must_use]
    pub fn up2(&self) -> Price {
        self.up2
    }

    #[inline]
    #[must_use]
    pub fn down1(&self) -> Price {
        self.down1
    }

    #[inline]
    #[must_use]
    pub fn down2(&self) -> Price {
        self.down2
    }
}

/// Initial balance output: session high/low and optional extensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IbValue {
    high: Price,
    low: Price,
    extensions: Option<IbExtensions>,
}

impl IbValue {
    #[inline]
    #[must_use]
    pub fn high(&self) -> Price {
        self.high
    }

    #[inline]
    #[must_use]
    pub fn low(&self) -> Price {
        self.low
    }

    /// `high − low`.
    #[inline]
    #[must_use]
    pub fn range(&self) -> Price {
        self.high - self.low
    }

    /// `None` when extensions are disabled in the config.
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> Option<IbExtensions> {
        self.extensions
    }
}

impl Display for IbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IB(h: {}, l: {})", self.high, self.low)
    }
}

impl From<Option<IbValue>> for Record {
    fn from(value: Option<IbValue>) -> Self {
        let ext = value.and_then(|v| v.extensions);
        Record::with_capacity(6)
            .with("ibHigh", value.map(|v| v.high))
            .with("ibLow", value.map(|v| v.low))
            .with("ext1", ext.map(|e| e.up1))
            .with("ext2", ext.map(|e| e.up2))
            .with("extm1", ext.map(|e| e.down1))
            .with("extm2", ext.map(|e| e.down2))
    }
}

/// Initial Balance (IB).
///
/// Tracks the high and low of a fixed-length opening window and projects
/// extension levels above and below it for the rest of that calendar day.
///
/// The window opens only on a bar stamped exactly at the configured start,
/// to the second (`08:30:00`, not `08:30:30`), and only once the previous
/// window has closed. It closes on the first bar at or after
/// `start + duration`; that bar is not included. Output is `None` until a
/// window has opened, and again from the first bar of the next calendar
/// day until the next window opens.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{Ib, IbConfig};
/// # use quantedge_sessions::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, f64, &'static str);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.1 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.1 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn timestamp(&self) -> Timestamp {
/// #         Timestamp::parse_from_str(self.2, "%Y-%m-%d %H:%M:%S").unwrap()
/// #     }
/// # }
///
/// let mut ib = Ib::new(IbConfig::default());
///
/// assert!(ib.update(&Bar(105.0, 100.0, "2024-03-04 08:29:00")).is_none());
///
/// let value = ib.update(&Bar(110.0, 100.0, "2024-03-04 08:30:00")).unwrap();
/// let ext = value.extensions().unwrap();
/// assert_eq!(ext.up1(), 115.0);
/// assert_eq!(ext.down2(), 90.0);
/// ```
#[derive(Clone, Debug)]
pub struct Ib {
    config: IbConfig,
    closed: bool,
    range: Option<Range>,
    session_start: Option<Timestamp>,
    last_timestamp: Option<Timestamp>,
    current: Option<IbValue>,
}

impl Ib {
    /// Forward-only update. Equivalent to [`compute`](Ib::compute), which
    /// ignores history for this indicator.
    pub fn update(&mut self, bar: &impl Ohlcv) -> Option<IbValue> {
        let ts = bar.timestamp();
        debug_assert!(
            self.last_timestamp.is_none_or(|last| last <= ts),
            "timestamp must be non-decreasing: last={:?}, got={ts}",
            self.last_timestamp,
        );
        self.last_timestamp = Some(ts);

        if self.closed && is_at(&ts, self.config.start) {
            debug!("{self}: session opened at {ts}");
            self.closed = false;
            self.session_start = Some(ts);
            self.range = Some(Range::of(bar));
        } else if let Some(start) = self.session_start.filter(|_| !self.closed) {
            // a window ending past the calendar's range never closes
            let ended = start
                .checked_add_signed(self.config.duration)
                .is_some_and(|end| ts >= end);
            if ended {
                self.closed = true;
                debug!("{self}: session closed at {ts}, range {:?}", self.range);
            } else if let Some(range) = self.range.as_mut() {
                range.extend(bar);
            }
        }

        self.current = match (self.range, self.session_start) {
            (Some(range), Some(start)) if start.date() == ts.date() => Some(self.levels(range)),
            _ => None,
        };

        self.current
    }

    fn levels(&self, range: Range) -> IbValue {
        let extensions = self.config.extensions.then(|| {
            let width = range.width();
            let first = self.config.first_extension.of(width);
            let second = self.config.second_extension.of(width);

            IbExtensions {
                up1: range.high + first,
                up2: range.high + second,
                down1: range.low - first,
                down2: range.low - second,
            }
        });

        IbValue {
            high: range.high,
            low: range.low,
            extensions,
        }
    }
}

impl Indicator for Ib {
    type Config = IbConfig;
    type Output = Option<IbValue>;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            closed: true,
            range: None,
            session_start: None,
            last_timestamp: None,
            current: None,
        }
    }

    #[inline]
    fn config(&self) -> &IbConfig {
        &self.config
    }

    #[inline]
    fn compute<H>(&mut self, bar: &H::Bar, _index: usize, _history: &H) -> Option<IbValue>
    where
        H: History + ?Sized,
    {
        self.update(bar)
    }

    #[inline]
    fn value(&self) -> Option<IbValue> {
        self.current
    }
}

impl Display for Ib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[allow(clippy::cast_precision_loss)]
        let minutes = self.config.duration.num_milliseconds() as f64 / 60_000.0;
        write!(f, "IB({}, {minutes}m)", self.config.start.format("%H:%M"))
    }
}
