/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar timestamp in the session's reference clock.
///
/// No timezone is attached. Bars must already carry the wall-clock time
/// the sessions are configured in (e.g. exchange time); session boundaries
/// are matched against [`NaiveDateTime::time`](chrono::NaiveDateTime::time)
/// and day rollover against [`NaiveDateTime::date`](chrono::NaiveDateTime::date).
pub type Timestamp = chrono::NaiveDateTime;

/// OHLC bar with bid/offer volume, used as input to all indicators.
///
/// Implement this on your own bar type to avoid per-bar conversion.
///
/// # Ordering
///
/// Timestamps must be non-decreasing between consecutive calls to
/// [`Indicator::compute`](crate::Indicator::compute). Behaviour is
/// unspecified if a timestamp goes backwards.
///
/// # Example
///
/// ```
/// use quantedge_sessions::{Ohlcv, Price, Timestamp};
///
/// struct MyBar {
///     o: f64, h: f64, l: f64, c: f64,
///     bid: f64, ask: f64,
///     ts: Timestamp,
/// }
///
/// impl Ohlcv for MyBar {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn timestamp(&self) -> Timestamp { self.ts }
///     fn bid_volume(&self) -> f64 { self.bid }
///     fn offer_volume(&self) -> f64 { self.ask }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;

    /// Bar timestamp with second resolution.
    fn timestamp(&self) -> Timestamp;

    /// Volume traded at the bid. Defaults to `0.0`.
    ///
    /// Only [`Cvd`](crate::Cvd) reads volume; price-level indicators
    /// ignore it.
    fn bid_volume(&self) -> f64 {
        0.0
    }

    /// Volume traded at the offer. Defaults to `0.0`.
    fn offer_volume(&self) -> f64 {
        0.0
    }
}
