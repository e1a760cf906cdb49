use crate::{ConfigError, History, Record};

use chrono::NaiveTime;
use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a session [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its session
/// parameters. Configs are value types: cheap to copy, compare, and hash.
pub trait IndicatorConfig: Sized + Copy + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder pre-filled with the default session parameters.
    fn builder() -> Self::Builder;

    /// Clock time at which the tracked session opens.
    fn start(&self) -> NaiveTime;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Sets the session start clock time.
    #[must_use]
    fn start(self, hour: u32, minute: u32) -> Self;

    /// Validates the parameters and builds the config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid parameter.
    fn build(self) -> Result<Config, ConfigError>;
}

/// A streaming, session-aware indicator.
///
/// Indicators own their session state and update incrementally on each call
/// to [`compute`](Indicator::compute). Bars must be fed once each, in
/// non-decreasing timestamp order. Fields that are not available yet are
/// `None`; they are never zero and never an infinite placeholder.
///
/// `history` is the host's read-only bar store. It must contain the bars
/// `0..=index`, with `bar` at `index`. Only [`PriorRth`](crate::PriorRth)
/// scans it and only [`Cvd`](crate::Cvd) reads the prior bar; the others
/// ignore it and also expose a forward-only `update`.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{Rth, RthConfig};
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
///     Bar(100.0, "2024-03-04 07:59:00"),
///     Bar(101.0, "2024-03-04 08:30:00"),
///     Bar(103.0, "2024-03-04 08:31:00"),
/// ];
/// let mut rth = Rth::new(RthConfig::default());
///
/// assert!(rth.compute(&bars[0], 0, &bars).is_none());
/// rth.compute(&bars[1], 1, &bars);
/// let value = rth.compute(&bars[2], 2, &bars).unwrap();
///
/// assert_eq!(value.open(), 101.0);
/// assert_eq!(value.high(), 103.0);
/// assert_eq!(value.mid(), 102.0);
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Computed output type. `Option<_>` when the whole output appears and
    /// disappears together, a struct of optional fields otherwise.
    type Output: Copy + Send + Sync + Debug + Into<Record>;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Config this indicator was created with.
    fn config(&self) -> &Self::Config;

    /// Drops all session state, as if freshly created.
    fn reset(&mut self) {
        *self = Self::new(*self.config());
    }

    /// Feeds the bar at `index` and returns the updated output.
    fn compute<H>(&mut self, bar: &H::Bar, index: usize, history: &H) -> Self::Output
    where
        H: History + ?Sized;

    /// Returns the last computed output without advancing state.
    ///
    /// This is a cached field read, O(1) with no computation.
    fn value(&self) -> Self::Output;

    /// Last computed output as a named-field [`Record`].
    fn record(&self) -> Record {
        self.value().into()
    }
}
