use std::fmt::Display;

use chrono::NaiveTime;
use log::debug;

use crate::{
    ConfigError, History, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price,
    Record, SessionWindow, Timestamp, session::Range,
};

/// Configuration for the regular trading hours ([`Rth`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{IndicatorConfig, IndicatorConfigBuilder, RthConfig};
///
/// let config = RthConfig::builder().start(9, 30).end(16, 15).build().unwrap();
/// assert_eq!(config.to_string(), "RthConfig(09:30-16:15)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct RthConfig {
    window: SessionWindow,
}

impl IndicatorConfig for RthConfig {
    type Builder = RthConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RthConfigBuilder::new()
    }

    #[inline]
    fn start(&self) -> NaiveTime {
        self.window.start()
    }
}

impl RthConfig {
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

impl Display for RthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RthConfig({})", self.window)
    }
}

/// Builder for [`RthConfig`].
///
/// Defaults: 08:30-16:00.
pub struct RthConfigBuilder {
    start: (u32, u32),
    end: (u32, u32),
}

impl RthConfigBuilder {
    fn new() -> Self {
        Self {
            start: (8, 30),
            end: (16, 0),
        }
    }

    /// Sets the session end clock time.
    #[inline]
    #[must_use]
    pub fn end(mut self, hour: u32, minute: u32) -> Self {
        self.end = (hour, minute);
        self
    }

    fn window(&self) -> Result<SessionWindow, ConfigError> {
        SessionWindow::from_hm(self.start.0, self.start.1, self.end.0, self.end.1)
    }
}

impl IndicatorConfigBuilder<RthConfig> for RthConfigBuilder {
    #[inline]
    fn start(mut self, hour: u32, minute: u32) -> Self {
        self.start = (hour, minute);
        self
    }

    fn build(self) -> Result<RthConfig, ConfigError> {
        Ok(RthConfig {
            window: self.window()?,
        })
    }
}

/// Running statistics of the active session.
///
/// ```text
/// mid = (high + low) / 2
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RthValue {
    high: Price,
    low: Price,
    open: Price,
}

impl RthValue {
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

    #[inline]
    #[must_use]
    pub fn mid(&self) -> Price {
        f64::midpoint(self.high, self.low)
    }

    /// Open of the bar that started (or last restarted) the session.
    #[inline]
    #[must_use]
    pub fn open(&self) -> Price {
        self.open
    }
}

impl Display for RthValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RTH(o: {}, h: {}, l: {}, m: {})",
            self.open,
            self.high,
            self.low,
            self.mid()
        )
    }
}

impl From<Option<RthValue>> for Record {
    fn from(value: Option<RthValue>) -> Self {
        Record::with_capacity(4)
            .with("rthHigh", value.map(|v| v.high))
            .with("rthLow", value.map(|v| v.low))
            .with("rthMid", value.map(|v| v.mid()))
            .with("rthOpen", value.map(|v| v.open))
    }
}

#[derive(Clone, Copy, Debug)]
struct Session {
    range: Range,
    open: Price,
}

/// Regular trading hours session range (RTH).
///
/// While a bar's hour lies in `[start.hour, end.hour)` the session is
/// active and tracks high, low and open; outside it the output is `None`.
///
/// The session (re)starts on the first active bar after an inactive one,
/// and again on a bar stamped exactly at the configured start, to the
/// second. A restart resets high, low and open to that bar. Because entry is
/// hour-granular, with a 08:30 start a bar at 08:05 already activates the
/// session; the 08:30:00 bar then restarts it.
#[derive(Clone, Debug)]
pub struct Rth {
    config: RthConfig,
    session: Option<Session>,
    last_timestamp: Option<Timestamp>,
}

impl Rth {
    /// Forward-only update. Equivalent to [`compute`](Rth::compute), which
    /// ignores history for this indicator.
    pub fn update(&mut self, bar: &impl Ohlcv) -> Option<RthValue> {
        let ts = bar.timestamp();
        debug_assert!(
            self.last_timestamp.is_none_or(|last| last <= ts),
            "timestamp must be non-decreasing: last={:?}, got={ts}",
            self.last_timestamp,
        );
        self.last_timestamp = Some(ts);

        let window = self.config.window;

        if window.contains_hour(&ts) {
            if self.session.is_none() || window.is_start(&ts) {
                if self.session.is_none() {
                    debug!("{self}: session active at {ts}");
                }
                self.session = Some(Session {
                    range: Range::of(bar),
                    open: bar.open(),
                });
            } else if let Some(session) = self.session.as_mut() {
                session.range.extend(bar);
            }
        } else if self.session.take().is_some() {
            debug!("{self}: session inactive at {ts}");
        }

        self.value()
    }
}

impl Indicator for Rth {
    type Config = RthConfig;
    type Output = Option<RthValue>;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            session: None,
            last_timestamp: None,
        }
    }

    #[inline]
    fn config(&self) -> &RthConfig {
        &self.config
    }

    #[inline]
    fn compute<H>(&mut self, bar: &H::Bar, _index: usize, _history: &H) -> Option<RthValue>
    where
        H: History + ?Sized,
    {
        self.update(bar)
    }

    #[inline]
    fn value(&self) -> Option<RthValue> {
        self.session.map(|session| RthValue {
            high: session.range.high,
            low: session.range.low,
            open: session.open,
        })
    }
}

impl Display for Rth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RTH({})", self.config.window)
    }
}
