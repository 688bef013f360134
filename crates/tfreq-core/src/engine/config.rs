use crate::core::constants::{PICOSECOND_SI, SPEED_OF_LIGHT_CM_S};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PADDING_FACTOR: usize = 15;
pub const DEFAULT_SIGMA_DIVISOR: f64 = 2.5;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Padding factor must be at least 1 (got {0})")]
    InvalidPaddingFactor(usize),
    #[error("Parameter '{name}' must be finite and positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("Unknown {kind} '{value}'. Expected one of: {expected}")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Which time origins contribute to each lag of the autocorrelation estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginRange {
    /// Every valid origin: `M - m` of them for lag `m`.
    #[default]
    All,
    /// Every valid origin except the last one, as older `tfreq` releases did.
    /// The estimate at the final lag is then always zero.
    SkipLast,
}

impl OriginRange {
    /// Number of origins summed for lag `lag` of an `n_frames`-long trajectory.
    pub fn origin_count(self, n_frames: usize, lag: usize) -> usize {
        let valid = n_frames.saturating_sub(lag);
        match self {
            OriginRange::All => valid,
            OriginRange::SkipLast => valid.saturating_sub(1),
        }
    }
}

impl FromStr for OriginRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(OriginRange::All),
            "skip-last" | "skip_last" => Ok(OriginRange::SkipLast),
            _ => Err(ConfigError::UnknownVariant {
                kind: "origin range",
                value: s.to_string(),
                expected: "all, skip-last",
            }),
        }
    }
}

/// How the power spectrum is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// The largest power in the reported half of the spectrum becomes 1.
    #[default]
    Peak,
    /// Total power integrated over the trajectory duration becomes 1.
    TotalPower,
}

impl FromStr for Normalization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peak" => Ok(Normalization::Peak),
            "total-power" | "total_power" => Ok(Normalization::TotalPower),
            _ => Err(ConfigError::UnknownVariant {
                kind: "normalization",
                value: s.to_string(),
                expected: "peak, total-power",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AutocorrelationConfig {
    pub origin_range: OriginRange,
}

/// Gaussian smoothing applied in the lag domain before the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// The window width is `sigma = M / sigma_divisor` for `M` genuine lags.
    pub sigma_divisor: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            sigma_divisor: DEFAULT_SIGMA_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumConfig {
    /// The VAC sequence is zero-padded to `padding_factor` times its length.
    pub padding_factor: usize,
    pub normalization: Normalization,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            padding_factor: DEFAULT_PADDING_FACTOR,
            normalization: Normalization::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitsConfig {
    /// Length of the trajectory's time unit in seconds.
    pub time_unit_seconds: f64,
    /// Speed of light in the reported wavenumber's length unit per second.
    pub speed_of_light: f64,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            time_unit_seconds: PICOSECOND_SI,
            speed_of_light: SPEED_OF_LIGHT_CM_S,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisConfig {
    pub autocorrelation: AutocorrelationConfig,
    pub window: WindowConfig,
    pub spectrum: SpectrumConfig,
    pub units: UnitsConfig,
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
    }
}

/// Builds an [`AnalysisConfig`], filling unset parameters with defaults and
/// validating the result.
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    origin_range: Option<OriginRange>,
    sigma_divisor: Option<f64>,
    padding_factor: Option<usize>,
    normalization: Option<Normalization>,
    time_unit_seconds: Option<f64>,
    speed_of_light: Option<f64>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin_range(mut self, range: OriginRange) -> Self {
        self.origin_range = Some(range);
        self
    }
    pub fn sigma_divisor(mut self, divisor: f64) -> Self {
        self.sigma_divisor = Some(divisor);
        self
    }
    pub fn padding_factor(mut self, factor: usize) -> Self {
        self.padding_factor = Some(factor);
        self
    }
    pub fn normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = Some(normalization);
        self
    }
    pub fn time_unit_seconds(mut self, seconds: f64) -> Self {
        self.time_unit_seconds = Some(seconds);
        self
    }
    pub fn speed_of_light(mut self, speed: f64) -> Self {
        self.speed_of_light = Some(speed);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let defaults = AnalysisConfig::default();

        let padding_factor = self
            .padding_factor
            .unwrap_or(defaults.spectrum.padding_factor);
        if padding_factor == 0 {
            return Err(ConfigError::InvalidPaddingFactor(padding_factor));
        }

        let sigma_divisor = positive(
            "sigma_divisor",
            self.sigma_divisor.unwrap_or(defaults.window.sigma_divisor),
        )?;
        let time_unit_seconds = positive(
            "time_unit_seconds",
            self.time_unit_seconds
                .unwrap_or(defaults.units.time_unit_seconds),
        )?;
        let speed_of_light = positive(
            "speed_of_light",
            self.speed_of_light.unwrap_or(defaults.units.speed_of_light),
        )?;

        Ok(AnalysisConfig {
            autocorrelation: AutocorrelationConfig {
                origin_range: self.origin_range.unwrap_or_default(),
            },
            window: WindowConfig { sigma_divisor },
            spectrum: SpectrumConfig {
                padding_factor,
                normalization: self.normalization.unwrap_or_default(),
            },
            units: UnitsConfig {
                time_unit_seconds,
                speed_of_light,
            },
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
