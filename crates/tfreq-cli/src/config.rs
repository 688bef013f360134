use crate::cli::Cli;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tfreq::core::io::vel::VelReadOptions;
use tfreq::engine::config::{self as core_config, Normalization, OriginRange};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialInputConfig {
    atoms: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAutocorrelationConfig {
    #[serde(rename = "origin-range")]
    origin_range: Option<OriginRange>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWindowConfig {
    #[serde(rename = "sigma-divisor")]
    sigma_divisor: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSpectrumConfig {
    #[serde(rename = "padding-factor")]
    padding_factor: Option<usize>,
    normalization: Option<Normalization>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialUnitsConfig {
    #[serde(rename = "time-unit-seconds")]
    time_unit_seconds: Option<f64>,
    #[serde(rename = "speed-of-light")]
    speed_of_light: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    input: Option<PartialInputConfig>,
    autocorrelation: Option<PartialAutocorrelationConfig>,
    window: Option<PartialWindowConfig>,
    spectrum: Option<PartialSpectrumConfig>,
    units: Option<PartialUnitsConfig>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub z_path: PathBuf,
    pub ft_path: PathBuf,
    pub read_options: VelReadOptions,
    pub analysis: core_config::AnalysisConfig,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final configuration.
    ///
    /// Precedence, highest first: dedicated CLI flags, `--set` values, the
    /// config file, built-in defaults.
    pub fn merge_with_cli(mut self, args: &Cli) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let input_config = self.input.take().unwrap_or_default();
        let acf_config = self.autocorrelation.take().unwrap_or_default();
        let window_config = self.window.take().unwrap_or_default();
        let spectrum_config = self.spectrum.take().unwrap_or_default();
        let units_config = self.units.take().unwrap_or_default();

        let atoms = args.atoms.or(input_config.atoms);
        if atoms == Some(0) {
            return Err(CliError::Config(
                "The atom count must be at least 1.".to_string(),
            ));
        }

        let mut builder = core_config::AnalysisConfig::builder();
        if let Some(range) = args.origin_range.or(acf_config.origin_range) {
            builder = builder.origin_range(range);
        }
        if let Some(divisor) = window_config.sigma_divisor {
            builder = builder.sigma_divisor(divisor);
        }
        if let Some(factor) = args.padding_factor.or(spectrum_config.padding_factor) {
            builder = builder.padding_factor(factor);
        }
        if let Some(normalization) = args.normalization.or(spectrum_config.normalization) {
            builder = builder.normalization(normalization);
        }
        if let Some(seconds) = units_config.time_unit_seconds {
            builder = builder.time_unit_seconds(seconds);
        }
        if let Some(speed) = units_config.speed_of_light {
            builder = builder.speed_of_light(speed);
        }
        let analysis = builder.build()?;

        let (z_path, ft_path) = report_paths(&args.input, args.output_dir.as_deref())?;

        Ok(AppConfig {
            input_path: args.input.clone(),
            z_path,
            ft_path,
            read_options: VelReadOptions { atoms },
            analysis,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "input.atoms" => {
                    self.input.get_or_insert_with(Default::default).atoms =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "autocorrelation.origin-range" => {
                    self.autocorrelation
                        .get_or_insert_with(Default::default)
                        .origin_range = Some(parse_value(key, value_str, "origin range")?);
                }
                "window.sigma-divisor" => {
                    self.window
                        .get_or_insert_with(Default::default)
                        .sigma_divisor = Some(parse_value(key, value_str, "float")?);
                }
                "spectrum.padding-factor" => {
                    self.spectrum
                        .get_or_insert_with(Default::default)
                        .padding_factor = Some(parse_value(key, value_str, "integer")?);
                }
                "spectrum.normalization" => {
                    self.spectrum
                        .get_or_insert_with(Default::default)
                        .normalization = Some(parse_value(key, value_str, "normalization")?);
                }
                "units.time-unit-seconds" => {
                    self.units
                        .get_or_insert_with(Default::default)
                        .time_unit_seconds = Some(parse_value(key, value_str, "float")?);
                }
                "units.speed-of-light" => {
                    self.units
                        .get_or_insert_with(Default::default)
                        .speed_of_light = Some(parse_value(key, value_str, "float")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

/// Derives `Z.<name>` and `FT.<name>` from the input file name.
///
/// The reports land in `output_dir` if given, otherwise next to the input.
pub fn report_paths(input: &Path, output_dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Input path '{}' does not name a file.",
                input.display()
            ))
        })?;

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    Ok((
        dir.join(format!("Z.{}", file_name)),
        dir.join(format!("FT.{}", file_name)),
    ))
}
