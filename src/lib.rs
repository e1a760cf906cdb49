//! Session-aware streaming indicators for intraday charts.
//!
//! Indicators accept any type implementing [`Ohlcv`] and track levels of a
//! daily trading session: the opening range ([`Ib`]), the running session
//! range ([`Rth`]), the previous session's statistics ([`PriorRth`]) and the
//! session cumulative volume delta ([`Cvd`]). Values are `None` until the
//! session has produced them.
//!
//! Each indicator type exposes [`new`](Ib::new), [`compute`](Ib::compute),
//! [`value`](Ib::value), [`reset`](Ib::reset) and [`record`](Ib::record) as
//! inherent methods, so no trait import is needed. Import [`Indicator`] only
//! for generic code.
//!
//! Configs can be built in code with their builders, or deserialized from
//! the chart host's parameter records ([`IbParams`], [`RthParams`],
//! [`CvdParams`]).

mod cvd;
mod error;
mod history;
mod ib;
mod indicator;
mod ohlcv;
mod params;
mod prior_rth;
mod record;
mod rth;
mod session;

pub use crate::error::ConfigError;
pub use crate::history::History;
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::ohlcv::{Ohlcv, Price, Timestamp};
pub use crate::params::{CvdParams, IbParams, RthParams};
pub use crate::record::Record;
pub use crate::session::SessionWindow;

pub use crate::cvd::{Classification, Cvd, CvdConfig, CvdConfigBuilder, CvdValue, DeltaCandle};
pub use crate::ib::{Ib, IbConfig, IbConfigBuilder, IbExtensions, IbValue, Percent};
pub use crate::prior_rth::{PriorRth, PriorRthConfig, PriorRthConfigBuilder, PriorRthValue};
pub use crate::rth::{Rth, RthConfig, RthConfigBuilder, RthValue};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute<H>(&mut self, bar: &H::Bar, index: usize, history: &H) -> $output
            where
                H: History + ?Sized,
            {
                <Self as Indicator>::compute(self, bar, index, history)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> $output {
                <Self as Indicator>::value(self)
            }

            /// See [`Indicator::reset`].
            #[inline]
            pub fn reset(&mut self) {
                <Self as Indicator>::reset(self);
            }

            /// See [`Indicator::record`].
            #[must_use]
            pub fn record(&self) -> Record {
                <Self as Indicator>::record(self)
            }
        }
    };
}

impl_indicator_methods!(Ib, IbConfig, Option<IbValue>);
impl_indicator_methods!(Rth, RthConfig, Option<RthValue>);
impl_indicator_methods!(PriorRth, PriorRthConfig, PriorRthValue);
impl_indicator_methods!(Cvd, CvdConfig, CvdValue);

#[cfg(test)]
mod test_util;
