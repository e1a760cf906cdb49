use std::fmt::Display;

use chrono::NaiveTime;
use log::trace;

use crate::{
    ConfigError, History, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price,
    Record, SessionWindow, Timestamp,
};

/// How a bar's direction is decided for coloring.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum Classification {
    /// Up if the close breaks above the prior bar's high, down if it breaks
    /// below the prior bar's low.
    #[default]
    Strong,
    /// Up if the bar closes above its open, down if below.
    Simple,
}

impl Classification {
    fn candle(self, bar: &impl Ohlcv, prior: &impl Ohlcv, open: Price, close: Price) -> DeltaCandle {
        let (up, down) = match self {
            Self::Strong => (bar.close() > prior.high(), bar.close() < prior.low()),
            Self::Simple => (bar.close() > bar.open(), bar.close() < bar.open()),
        };

        if down {
            DeltaCandle::Down { open, close }
        } else if up {
            DeltaCandle::Up { open, close }
        } else {
            DeltaCandle::Neutral { open, close }
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Configuration for the session cumulative volume delta ([`Cvd`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{Classification, CvdConfig, IndicatorConfig, IndicatorConfigBuilder};
///
/// let config = CvdConfig::builder()
///     .start(9, 30)
///     .end(16, 0)
///     .classification(Classification::Simple)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.to_string(), "CvdConfig(09:30-16:00, Simple)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct CvdConfig {
    window: SessionWindow,
    classification: Classification,
}

impl IndicatorConfig for CvdConfig {
    type Builder = CvdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        CvdConfigBuilder::new()
    }

    #[inline]
    fn start(&self) -> NaiveTime {
        self.window.start()
    }
}

impl CvdConfig {
    #[inline]
    #[must_use]
    pub fn window(&self) -> &SessionWindow {
        &self.window
    }

    #[inline]
    #[must_use]
    pub fn classification(&self) -> Classification {
        self.classification
    }
}

impl Display for CvdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CvdConfig({}, {})", self.window, self.classification)
    }
}

/// Builder for [`CvdConfig`].
///
/// Defaults: 08:30-16:00, [`Classification::Strong`].
pub struct CvdConfigBuilder {
    start: (u32, u32),
    end: (u32, u32),
    classification: Classification,
}

impl CvdConfigBuilder {
    fn new() -> Self {
        Self {
            start: (8, 30),
            end: (16, 0),
            classification: Classification::Strong,
        }
    }

    /// Sets the session end clock time.
    #[inline]
    #[must_use]
    pub fn end(mut self, hour: u32, minute: u32) -> Self {
        self.end = (hour, minute);
        self
    }

    #[inline]
    #[must_use]
    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }
}

impl IndicatorConfigBuilder<CvdConfig> for CvdConfigBuilder {
    #[inline]
    fn start(mut self, hour: u32, minute: u32) -> Self {
        self.start = (hour, minute);
        self
    }

    fn build(self) -> Result<CvdConfig, ConfigError> {
        Ok(CvdConfig {
            window: SessionWindow::from_hm(self.start.0, self.start.1, self.end.0, self.end.1)?,
            classification: self.classification,
        })
    }
}

/// Cumulative delta candle of one in-session bar, tagged by direction.
///
/// `open` is the cumulative delta before the bar, `close` after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeltaCandle {
    Up { open: Price, close: Price },
    Down { open: Price, close: Price },
    Neutral { open: Price, close: Price },
}

impl DeltaCandle {
    #[inline]
    #[must_use]
    pub fn open(&self) -> Price {
        match *self {
            Self::Up { open, .. } | Self::Down { open, .. } | Self::Neutral { open, .. } => open,
        }
    }

    #[inline]
    #[must_use]
    pub fn close(&self) -> Price {
        match *self {
            Self::Up { close, .. } | Self::Down { close, .. } | Self::Neutral { close, .. } => {
                close
            }
        }
    }

    /// Color tag handed to the renderer.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Self::Up { .. } => "deepskyblue",
            Self::Down { .. } => "red",
            Self::Neutral { .. } => "gray",
        }
    }
}

/// Cumulative volume delta output for one bar.
///
/// ```text
/// delta = offer_volume − bid_volume
/// open  = cumulative before the bar
/// close = open + delta
/// value = |delta|
/// ```
///
/// Outside the session `open == close == cumulative`, `delta` and `value`
/// are zero, and there is no candle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CvdValue {
    open: Price,
    close: Price,
    delta: f64,
    candle: Option<DeltaCandle>,
}

impl CvdValue {
    #[inline]
    #[must_use]
    pub fn open(&self) -> Price {
        self.open
    }

    #[inline]
    #[must_use]
    pub fn close(&self) -> Price {
        self.close
    }

    #[inline]
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Absolute delta.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.delta.abs()
    }

    /// Direction-tagged candle, `None` outside the session.
    #[inline]
    #[must_use]
    pub fn candle(&self) -> Option<DeltaCandle> {
        self.candle
    }
}

impl Display for CvdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CVD(o: {}, c: {}, d: {})", self.open, self.close, self.delta)
    }
}

impl From<CvdValue> for Record {
    fn from(value: CvdValue) -> Self {
        let pick = |wanted: fn(&DeltaCandle) -> bool| value.candle.filter(wanted);
        let up = pick(|c| matches!(c, DeltaCandle::Up { .. }));
        let down = pick(|c| matches!(c, DeltaCandle::Down { .. }));
        let neutral = pick(|c| matches!(c, DeltaCandle::Neutral { .. }));

        let record = Record::with_capacity(10)
            .with("open", Some(value.open))
            .with("close", Some(value.close))
            .with("delta", Some(value.delta))
            .with("value", Some(value.value()))
            .with("up_open", up.map(|c| c.open()))
            .with("up_close", up.map(|c| c.close()))
            .with("down_open", down.map(|c| c.open()))
            .with("down_close", down.map(|c| c.close()))
            .with("neutral_open", neutral.map(|c| c.open()))
            .with("neutral_close", neutral.map(|c| c.close()));

        match value.candle {
            Some(candle) => record.with_color(candle.color()),
            None => record,
        }
    }
}

/// Session cumulative volume delta (CVD).
///
/// Adds `offer_volume − bid_volume` of every bar inside the session window
/// `[start, end)` to a running total. Unlike the range indicators the window
/// is matched exactly on the bar's own date, to the second. Bars outside it
/// leave the total untouched. The total is never reset between sessions.
///
/// Each in-session bar is classified up, down or neutral (see
/// [`Classification`]). Strong classification compares against the prior
/// bar from history; the first bar is compared against itself.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{Cvd, CvdConfig};
/// # use quantedge_sessions::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, f64, &'static str);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { 100.0 }
/// #     fn high(&self) -> Price { 100.0 }
/// #     fn low(&self) -> Price { 100.0 }
/// #     fn close(&self) -> Price { 100.0 }
/// #     fn timestamp(&self) -> Timestamp {
/// #         Timestamp::parse_from_str(self.2, "%Y-%m-%d %H:%M:%S").unwrap()
/// #     }
/// #     fn bid_volume(&self) -> f64 { self.0 }
/// #     fn offer_volume(&self) -> f64 { self.1 }
/// # }
///
/// let bars = vec![
///     Bar(10.0, 25.0, "2024-03-04 08:30:00"),
///     Bar(40.0, 5.0, "2024-03-04 08:31:00"),
///     Bar(99.0, 0.0, "2024-03-04 16:00:00"),
/// ];
/// let mut cvd = Cvd::new(CvdConfig::default());
///
/// assert_eq!(cvd.compute(&bars[0], 0, &bars).close(), 15.0);
/// assert_eq!(cvd.compute(&bars[1], 1, &bars).close(), -20.0);
/// assert_eq!(cvd.compute(&bars[2], 2, &bars).close(), -20.0);
/// ```
#[derive(Clone, Debug)]
pub struct Cvd {
    config: CvdConfig,
    cumulative: f64,
    last_timestamp: Option<Timestamp>,
    current: CvdValue,
}

impl Cvd {
    /// Running total of in-session delta.
    #[inline]
    #[must_use]
    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }
}

impl Indicator for Cvd {
    type Config = CvdConfig;
    type Output = CvdValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            cumulative: 0.0,
            last_timestamp: None,
            current: CvdValue::default(),
        }
    }

    #[inline]
    fn config(&self) -> &CvdConfig {
        &self.config
    }

    fn compute<H>(&mut self, bar: &H::Bar, index: usize, history: &H) -> CvdValue
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

        let open = self.cumulative;

        if !self.config.window.contains(&ts) {
            self.current = CvdValue {
                open,
                close: open,
                delta: 0.0,
                candle: None,
            };
            return self.current;
        }

        let delta = bar.offer_volume() - bar.bid_volume();
        let close = open + delta;
        let prior = history.prior_of(index).unwrap_or(bar);
        let candle = self.config.classification.candle(bar, prior, open, close);

        trace!("{self}: {ts} delta {delta} -> {close} ({})", candle.color());

        self.cumulative = close;
        self.current = CvdValue {
            open,
            close,
            delta,
            candle: Some(candle),
        };

        self.current
    }

    #[inline]
    fn value(&self) -> CvdValue {
        self.current
    }
}

impl Display for Cvd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CVD({}, {})",
            self.config.window, self.config.classification
        )
    }
}
