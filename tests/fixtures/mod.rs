#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime, Timelike};
use quantedge_sessions::{Indicator, Ohlcv, Price, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// 30-second bar parsed from the session fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub bid_volume: f64,
    pub offer_volume: f64,
}

impl Ohlcv for RefBar {
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

/// Three trading days, 2024-03-04 to 2024-03-06, 07:00:00 to 16:59:30.
/// The 15:15:30 bar of 2024-03-05 is missing.
const SESSION_PATH: &str = "tests/fixtures/data/session-30s.csv";

/// Load the 30-second session bars.
pub fn load_session_bars() -> Vec<RefBar> {
    load_records(SESSION_PATH, "invalid session bar")
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

pub fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).unwrap()
}

/// Session bars of `day` whose hour falls in `[start_hour, end_hour)`.
pub fn bars_in_hours(bars: &[RefBar], day: NaiveDate, start_hour: u32, end_hour: u32) -> Vec<&RefBar> {
    bars.iter()
        .filter(|b| b.timestamp.date() == day)
        .filter(|b| (start_hour..end_hour).contains(&b.timestamp.hour()))
        .collect()
}

/// `(high, low)` over a non-empty set of bars.
pub fn high_low<'a>(bars: impl IntoIterator<Item = &'a RefBar>) -> (f64, f64) {
    bars.into_iter().fold((f64::MIN, f64::MAX), |(h, l), b| {
        (h.max(b.high), l.min(b.low))
    })
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert two optional values are both gaps or both present and near.
pub fn assert_near_opt(actual: Option<f64>, expected: Option<f64>, tolerance: f64, context: &str) {
    match (actual, expected) {
        (None, None) => {}
        (Some(a), Some(e)) => assert_near(a, e, tolerance, context),
        (a, e) => panic!("{context}: presence mismatch, expected {e:?}, got {a:?}"),
    }
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}

/// Feeds every bar through `indicator` with the full history available,
/// collecting each output.
pub fn run<I: Indicator>(indicator: &mut I, bars: &[RefBar]) -> Vec<I::Output> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| indicator.compute(bar, i, bars))
        .collect()
}

/// Asserts that a reset indicator replays `bars` to the same outputs, bar
/// for bar, as a fresh one.
pub fn assert_replay_identical<I>(config: I::Config, bars: &[RefBar])
where
    I: Indicator,
    I::Output: PartialEq,
{
    let mut fresh = I::new(config);
    let first = run(&mut fresh, bars);

    fresh.reset();
    let second = run(&mut fresh, bars);

    for (i, (a, b)) in first.iter().zip(&second).enumerate() {
        assert_eq!(a, b, "replay diverged at bar {i} ({})", bars[i].timestamp);
    }
    assert_eq!(first.len(), second.len());
}
