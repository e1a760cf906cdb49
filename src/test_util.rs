// src/test_util.rs

use crate::{Ohlcv, Price, Timestamp};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() < e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

/// Parses `YYYY-MM-DD HH:MM:SS`.
pub fn at(s: &str) -> Timestamp {
    Timestamp::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|e| panic!("bad test timestamp {s}: {e}"))
}

#[derive(Clone, Debug)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub bid_volume: f64,
    pub offer_volume: f64,
    pub timestamp: Timestamp,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            bid_volume: 0.0,
            offer_volume: 0.0,
            timestamp: at("2024-03-04 00:00:00"),
        }
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn volumes(mut self, bid: f64, offer: f64) -> Self {
        self.bid_volume = bid;
        self.offer_volume = offer;
        self
    }
}

/// Convenience: bar with just a close price and timestamp (OHLC all equal to close).
pub fn bar(close: f64, time: Timestamp) -> Bar {
    Bar::new(close, close, close, close).at(time)
}

/// Bar with explicit high/low; open and close sit at the midpoint.
pub fn hl(high: f64, low: f64, time: &str) -> Bar {
    let mid = f64::midpoint(high, low);
    Bar::new(mid, high, low, mid).at(at(time))
}

impl Ohlcv for Bar {
    fn open(&self) -> Price {
        self.open
    }
    fn high(&self) -> Price {
        self.high
    }
    fn low(&self) -> Price {
        self.low
    }
    fn close(&self) -> Price {
        self.close
    }
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
    fn bid_volume(&self) -> f64 {
        self.bid_volume
    }
    fn offer_volume(&self) -> f64 {
        self.offer_volume
    }
}
