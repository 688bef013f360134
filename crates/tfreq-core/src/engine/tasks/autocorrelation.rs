use super::normalize_to_first;
use crate::core::models::spectrum::VacSequence;
use crate::core::models::trajectory::Trajectory;
use crate::engine::config::AutocorrelationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Vector3;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const STAGE: &str = "autocorrelation";

/// Estimates the normalized velocity autocorrelation function.
///
/// For lag `m` of an `M`-frame trajectory the estimate is the sum, over time
/// origins `n` and atoms, of `v[n + m] · v[n]`, divided by `M - m`. Which
/// origins take part is set by [`AutocorrelationConfig::origin_range`]. The
/// divisor stays `M - m` either way, giving the unbiased (but possibly
/// non-positive-definite) estimator rather than the biased one that divides
/// every lag by `M`.
///
/// The sequence is then divided by its lag-0 value, which is set to exactly
/// `1.0`, so it no longer depends on the overall velocity scale.
///
/// # Errors
///
/// Returns [`EngineError::EmptyTrajectory`] for a trajectory without frames and
/// [`EngineError::DegenerateNormalization`] if the lag-0 value is zero, as it
/// is for a trajectory whose velocities all vanish.
#[instrument(skip_all, name = "autocorrelation_task")]
pub fn run(
    trajectory: &Trajectory,
    config: &AutocorrelationConfig,
    reporter: &ProgressReporter,
) -> Result<VacSequence, EngineError> {
    let n_frames = trajectory.n_frames();
    if n_frames == 0 {
        return Err(EngineError::EmptyTrajectory);
    }

    info!(
        n_frames,
        n_atoms = trajectory.n_atoms(),
        origin_range = ?config.origin_range,
        "Starting velocity autocorrelation."
    );
    reporter.report(Progress::PhaseStart {
        name: "Autocorrelation",
    });
    reporter.report(Progress::TaskStart {
        total_steps: n_frames as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let lags = 0..n_frames;

    #[cfg(feature = "parallel")]
    let lags = (0..n_frames).into_par_iter();

    let mut samples: Vec<f64> = lags
        .map(|lag| {
            let origins = config.origin_range.origin_count(n_frames, lag);
            let z = lag_sum(trajectory, lag, origins) / (n_frames - lag) as f64;
            reporter.report(Progress::TaskIncrement);
            z
        })
        .collect();

    reporter.report(Progress::TaskFinish);

    debug!(raw_lag0 = samples[0], "Scaling by the lag-0 value.");
    normalize_to_first(&mut samples, STAGE)?;

    reporter.report(Progress::PhaseFinish);
    Ok(VacSequence::new(samples))
}

/// Sum of `v[n + lag] · v[n]` over the first `origins` time origins and all atoms.
fn lag_sum(trajectory: &Trajectory, lag: usize, origins: usize) -> f64 {
    trajectory
        .frames()
        .skip(lag)
        .zip(trajectory.frames())
        .take(origins)
        .map(|(later, earlier)| frame_dot(later.velocities(), earlier.velocities()))
        .sum()
}

fn frame_dot(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> f64 {
    a.iter().zip(b).map(|(va, vb)| va.dot(vb)).sum()
}
