//! Host parameter records.
//!
//! These mirror the chart host's input schema field for field and carry its
//! defaults, so a partially filled JSON object deserializes to a complete
//! set of inputs. Convert them to typed configs with `TryFrom`, which runs
//! the same validation as the builders.

use serde::Deserialize;

use crate::{
    Classification, ConfigError, CvdConfig, IbConfig, IndicatorConfig, IndicatorConfigBuilder,
    PriorRthConfig, RthConfig,
};

/// Inputs of the initial balance indicator.
///
/// ```
/// use quantedge_sessions::{IbConfig, IbParams};
///
/// let params: IbParams = serde_json::from_str(r#"{"duration": 30}"#).unwrap();
/// let config = IbConfig::try_from(params).unwrap();
///
/// assert_eq!(config.to_string(), "IbConfig(08:30, 30m, 50%, 100%)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IbParams {
    pub start_hour: u32,
    pub start_minute: u32,
    /// Minutes, fractional allowed.
    pub duration: f64,
    pub first_extension_percentage: f64,
    pub second_extension_percentage: f64,
    pub enable_extensions: bool,
}

impl Default for IbParams {
    fn default() -> Self {
        Self {
            start_hour: 8,
            start_minute: 30,
            duration: 60.0,
            first_extension_percentage: 50.0,
            second_extension_percentage: 100.0,
            enable_extensions: true,
        }
    }
}

impl TryFrom<IbParams> for IbConfig {
    type Error = ConfigError;

    fn try_from(params: IbParams) -> Result<Self, Self::Error> {
        IbConfig::builder()
            .start(params.start_hour, params.start_minute)
            .duration_minutes(params.duration)
            .extensions(
                params.first_extension_percentage,
                params.second_extension_percentage,
            )
            .enable_extensions(params.enable_extensions)
            .build()
    }
}

/// Inputs shared by the current and prior session range indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RthParams {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl Default for RthParams {
    fn default() -> Self {
        Self {
            start_hour: 8,
            start_minute: 30,
            end_hour: 16,
            end_minute: 0,
        }
    }
}

impl TryFrom<RthParams> for RthConfig {
    type Error = ConfigError;

    fn try_from(params: RthParams) -> Result<Self, Self::Error> {
        RthConfig::builder()
            .start(params.start_hour, params.start_minute)
            .end(params.end_hour, params.end_minute)
            .build()
    }
}

impl TryFrom<RthParams> for PriorRthConfig {
    type Error = ConfigError;

    fn try_from(params: RthParams) -> Result<Self, Self::Error> {
        PriorRthConfig::builder()
            .start(params.start_hour, params.start_minute)
            .end(params.end_hour, params.end_minute)
            .build()
    }
}

/// Inputs of the session cumulative volume delta indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvdParams {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    /// Classify against the prior bar's range instead of the bar's own open.
    pub strong_up_down: bool,
}

impl Default for CvdParams {
    fn default() -> Self {
        Self {
            start_hour: 8,
            start_minute: 30,
            end_hour: 16,
            end_minute: 0,
            strong_up_down: true,
        }
    }
}

impl TryFrom<CvdParams> for CvdConfig {
    type Error = ConfigError;

    fn try_from(params: CvdParams) -> Result<Self, Self::Error> {
        let classification = if params.strong_up_down {
            Classification::Strong
        } else {
            Classification::Simple
        };

        CvdConfig::builder()
            .start(params.start_hour, params.start_minute)
            .end(params.end_hour, params.end_minute)
            .classification(classification)
            .build()
    }
}
