use clap::Parser;
use std::path::PathBuf;
use tfreq::engine::config::{Normalization, OriginRange};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Timothy A.V. Teatro",
    version,
    about = "tfreq - Computes the velocity autocorrelation function and vibrational density of states of an MD velocity trajectory.",
    after_help = "Writes Z.<VELFILE> (autocorrelation) and FT.<VELFILE> (spectrum) next to the input file.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Path to the velocity trajectory file (e.g., case.vel).
    #[arg(required = true, value_name = "VELFILE")]
    pub input: PathBuf,

    /// Directory for the Z. and FT. report files.
    /// Defaults to the directory containing the input file.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Analysis Overrides ---
    /// Override the zero-padding factor applied before the Fourier transform.
    #[arg(short = 'P', long = "padding", value_name = "INT")]
    pub padding_factor: Option<usize>,

    /// Override the spectrum normalization ('peak' or 'total-power').
    #[arg(long, value_name = "MODE")]
    pub normalization: Option<Normalization>,

    /// Override which time origins enter the autocorrelation ('all' or 'skip-last').
    #[arg(long, value_name = "MODE")]
    pub origin_range: Option<OriginRange>,

    /// Number of atoms per frame. Skips sniffing the count from the first frame.
    #[arg(long, value_name = "INT")]
    pub atoms: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S spectrum.padding-factor=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    // --- Global Options ---
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the autocorrelation estimate.
    /// Only honoured when built with the `parallel` feature.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_input_and_overrides_parse() {
        let cli = Cli::try_parse_from([
            "tfreq",
            "-S",
            "spectrum.padding-factor=4",
            "--normalization",
            "total-power",
            "--origin-range",
            "skip-last",
            "-P",
            "20",
            "-vv",
            "case.vel",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("case.vel"));
        assert_eq!(cli.set_values, vec!["spectrum.padding-factor=4".to_string()]);
        assert_eq!(cli.normalization, Some(Normalization::TotalPower));
        assert_eq!(cli.origin_range, Some(OriginRange::SkipLast));
        assert_eq!(cli.padding_factor, Some(20));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn missing_input_is_a_usage_error() {
        assert!(Cli::try_parse_from(["tfreq"]).is_err());
    }

    #[test]
    fn unknown_normalization_is_rejected() {
        assert!(Cli::try_parse_from(["tfreq", "--normalization", "median", "case.vel"]).is_err());
    }
}
