use crate::cli::Cli;
use crate::config::{AppConfig, PartialAnalysisConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;
use tfreq::core::io::report;
use tfreq::core::io::traits::TrajectoryFile;
use tfreq::core::io::vel::VelFile;
use tfreq::core::models::trajectory::Trajectory;
use tfreq::engine::progress::ProgressReporter;
use tfreq::workflows::vdos::{self, VdosResult};
use tracing::{debug, info, warn};

pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    debug!("Resolved configuration: {:?}", config);

    let trajectory = VelFile::read_from_path(&config.input_path, &config.read_options).map_err(
        |source| CliError::Input {
            path: config.input_path.clone(),
            source,
        },
    )?;
    print_summary(&trajectory);

    let handler = if cli.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let result = vdos::run(&trajectory, &config.analysis, &reporter)?;

    write_reports(&result, &config)?;
    println!("Autocorrelation written to {}", config.z_path.display());
    println!("Spectrum written to {}", config.ft_path.display());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let partial = match &cli.config {
        Some(path) => PartialAnalysisConfig::from_file(path)?,
        None => PartialAnalysisConfig::default(),
    };
    partial.merge_with_cli(cli)
}

fn print_summary(trajectory: &Trajectory) {
    let (Some(first), Some(last)) = (trajectory.first_header(), trajectory.last_header()) else {
        return;
    };
    println!("Atoms:      {}", trajectory.n_atoms());
    println!("Start time: {} ps", first.time);
    println!("Stop time:  {} ps", last.time);
    println!("Duration:   {} ps", trajectory.duration());
    println!(
        "Steps:      {} to {} ({} frames)",
        first.time_step,
        last.time_step,
        trajectory.n_frames()
    );
}

/// Creates both report files before writing either, so an uncreatable
/// output aborts the run without leaving the other report behind.
fn write_reports(result: &VdosResult, config: &AppConfig) -> Result<()> {
    info!("Writing reports.");
    let mut z_writer = create_report(&config.z_path)?;
    let mut ft_writer = match create_report(&config.ft_path) {
        Ok(writer) => writer,
        Err(e) => {
            drop(z_writer);
            if let Err(cleanup) = fs::remove_file(&config.z_path) {
                warn!("Could not remove {}: {}", config.z_path.display(), cleanup);
            }
            return Err(e);
        }
    };

    report::write_vac_report(&mut z_writer, &result.vac, &result.time_axis)
        .map_err(|source| output_error(&config.z_path, source))?;
    report::write_spectrum_report(&mut ft_writer, &result.spectrum, &result.frequency_axis)
        .map_err(|source| output_error(&config.ft_path, source))
}

fn create_report(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| output_error(path, source))
}

fn output_error(path: &Path, source: io::Error) -> CliError {
    CliError::Output {
        path: path.to_path_buf(),
        source,
    }
}
