use crate::core::io::report::{self, FrequencyAxis, TimeAxis};
use crate::core::models::spectrum::{Spectrum, VacSequence};
use crate::core::models::trajectory::Trajectory;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::{autocorrelation, preprocess, transform};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument};

/// Everything the VDOS workflow produces, ready to be written out.
#[derive(Debug, Clone)]
pub struct VdosResult {
    /// The normalized autocorrelation estimate before padding and smoothing.
    pub raw_vac: VacSequence,
    /// The padded, windowed and renormalized sequence that was transformed.
    pub vac: VacSequence,
    pub spectrum: Spectrum,
    pub time_axis: TimeAxis,
    pub frequency_axis: FrequencyAxis,
}

impl VdosResult {
    /// Writes the autocorrelation report to `z_writer` and the spectrum report to `ft_writer`.
    pub fn write_reports<Z: Write, F: Write>(
        &self,
        z_writer: &mut Z,
        ft_writer: &mut F,
    ) -> io::Result<()> {
        report::write_vac_report(z_writer, &self.vac, &self.time_axis)?;
        report::write_spectrum_report(ft_writer, &self.spectrum, &self.frequency_axis)
    }

    /// Creates (or truncates) both report files, then writes them.
    ///
    /// If the spectrum file cannot be created, the freshly created
    /// autocorrelation file is removed again before the error is returned.
    pub fn write_reports_to_paths(&self, z_path: &Path, ft_path: &Path) -> io::Result<()> {
        let mut z_writer = BufWriter::new(File::create(z_path)?);
        let mut ft_writer = match File::create(ft_path) {
            Ok(file) => BufWriter::new(file),
            Err(e) => {
                drop(z_writer);
                let _ = fs::remove_file(z_path);
                return Err(e);
            }
        };
        self.write_reports(&mut z_writer, &mut ft_writer)
    }
}

/// Runs the full VAC → VDOS pipeline on a loaded trajectory.
///
/// The stages run strictly in order: autocorrelation estimate, zero padding
/// with Gaussian smoothing, then the Fourier transform with its power
/// normalization. Nothing is written; see [`VdosResult::write_reports`].
///
/// # Errors
///
/// Returns [`EngineError::InvalidTimeSpan`] if the trajectory does not span a
/// positive amount of simulation time, since the frequency axis is scaled by
/// the duration, and propagates any stage error.
#[instrument(skip_all, name = "vdos_workflow")]
pub fn run(
    trajectory: &Trajectory,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<VdosResult, EngineError> {
    let (Some(first), Some(last)) = (trajectory.first_header(), trajectory.last_header()) else {
        return Err(EngineError::EmptyTrajectory);
    };
    let duration = trajectory.duration();
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(EngineError::InvalidTimeSpan { duration });
    }
    info!(
        n_frames = trajectory.n_frames(),
        n_atoms = trajectory.n_atoms(),
        duration,
        "Starting VDOS workflow."
    );

    let raw_vac = autocorrelation::run(trajectory, &config.autocorrelation, reporter)?;

    let mut vac = raw_vac.clone();
    preprocess::run(
        &mut vac,
        &config.window,
        config.spectrum.padding_factor,
        reporter,
    )?;

    let spectrum = transform::run(
        &vac,
        config.spectrum.normalization,
        duration * config.units.time_unit_seconds,
        reporter,
    )?;

    let time_axis = TimeAxis {
        start: first.time,
        stop: last.time,
        lags: vac.lags(),
    };
    let frequency_axis = FrequencyAxis {
        duration,
        padding_factor: config.spectrum.padding_factor,
        time_unit_seconds: config.units.time_unit_seconds,
        speed_of_light: config.units.speed_of_light,
    };

    reporter.report(Progress::Message(format!(
        "{} autocorrelation samples, {} spectrum bins",
        vac.len(),
        spectrum.reported_len()
    )));
    info!("VDOS workflow complete.");

    Ok(VdosResult {
        raw_vac,
        vac,
        spectrum,
        time_axis,
        frequency_axis,
    })
}
