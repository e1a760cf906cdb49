use thiserror::Error;

/// Errors raised while building an indicator config.
///
/// Per-bar computation never fails; missing data is reported as `None`
/// in the indicator output instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid session time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("session window is empty: start {start} is not before end {end}")]
    EmptyWindow {
        start: chrono::NaiveTime,
        end: chrono::NaiveTime,
    },
    #[error("session duration must be a positive number of minutes, got {0}")]
    InvalidDuration(f64),
    #[error("extension percentage must be positive and finite, got {0}")]
    InvalidExtension(f64),
}
