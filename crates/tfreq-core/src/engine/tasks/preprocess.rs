use super::normalize_to_first;
use crate::core::models::spectrum::VacSequence;
use crate::engine::config::WindowConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::f64::consts::PI;
use tracing::{debug, instrument};

const STAGE: &str = "gaussian window";

/// Zero-pads, smooths and renormalizes a VAC sequence in place.
///
/// The sequence of `M` genuine lags is first extended with exact zeros to
/// `M * padding_factor` samples. Sample `i` is then weighted by a normal
/// density `exp(-i^2 / (2 sigma^2)) / (sigma sqrt(2 pi))` with
/// `sigma = M / window.sigma_divisor`, which damps the truncation at lag `M`
/// before the transform. Finally the sequence is rescaled so that sample 0 is
/// exactly `1.0` again.
///
/// A `padding_factor` of 1 skips no step; it simply adds no padding.
///
/// # Errors
///
/// Returns [`EngineError::SequenceTooLong`] if `lags * padding_factor` samples
/// cannot be allocated, leaving `vac` unpadded.
#[instrument(skip_all, name = "preprocess_task")]
pub fn run(
    vac: &mut VacSequence,
    window: &WindowConfig,
    padding_factor: usize,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    let lags = vac.lags();
    if lags == 0 {
        return Err(EngineError::EmptySequence { stage: STAGE });
    }

    reporter.report(Progress::PhaseStart {
        name: "Padding and Gaussian smoothing",
    });

    let too_long = || EngineError::SequenceTooLong {
        lags,
        padding_factor,
    };
    let padded_len = lags.checked_mul(padding_factor).ok_or_else(too_long)?;
    vac.pad_to(padded_len).map_err(|_| too_long())?;

    let sigma = lags as f64 / window.sigma_divisor;
    debug!(len = vac.len(), sigma, "Applying Gaussian window.");
    apply_gaussian_window(vac.samples_mut(), sigma);
    normalize_to_first(vac.samples_mut(), STAGE)?;

    reporter.report(Progress::PhaseFinish);
    Ok(())
}

/// The normal density with standard deviation `sigma`, evaluated at lag `i`.
pub fn gaussian_weight(i: usize, sigma: f64) -> f64 {
    let x = i as f64;
    (-x * x / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt())
}

fn apply_gaussian_window(samples: &mut [f64], sigma: f64) {
    for (i, z) in samples.iter_mut().enumerate() {
        *z *= gaussian_weight(i, sigma);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn window() -> WindowConfig {
        WindowConfig::default()
    }

    #[test]
    fn pads_to_multiple_and_keeps_lag_zero_at_one() {
        let mut vac = VacSequence::new(vec![1.0, 0.8, 0.3, -0.1]);
        run(&mut vac, &window(), 15, &ProgressReporter::new()).unwrap();
        assert_eq!(vac.len(), 60);
        assert_eq!(vac.lags(), 4);
        assert_eq!(vac.samples()[0], 1.0);
    }

    #[test]
    fn padded_samples_stay_exactly_zero() {
        let mut vac = VacSequence::new(vec![1.0, 0.9, 0.7, 0.4, 0.2]);
        run(&mut vac, &window(), 4, &ProgressReporter::new()).unwrap();
        assert!(vac.samples()[5..].iter().all(|&z| z == 0.0));
    }

    #[test]
    fn windowed_samples_follow_relative_gaussian_weights() {
        let mut vac = VacSequence::new(vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        run(&mut vac, &window(), 2, &ProgressReporter::new()).unwrap();
        let sigma = 5.0 / 2.5;
        for i in 1..5 {
            let expected = (-(i as f64).powi(2) / (2.0 * sigma * sigma)).exp();
            assert!(f64_approx_equal(vac.samples()[i], expected));
        }
    }

    #[test]
    fn padding_factor_of_one_runs_every_step() {
        let mut vac = VacSequence::new(vec![1.0, 0.5, 0.25]);
        run(&mut vac, &window(), 1, &ProgressReporter::new()).unwrap();
        assert_eq!(vac.len(), 3);
        assert_eq!(vac.samples()[0], 1.0);
        assert!(vac.samples()[1] < 0.5);
        assert!(vac.samples()[2] < 0.25);
    }

    #[test]
    fn long_sequences_do_not_overflow_the_window() {
        let mut vac = VacSequence::new(vec![1.0; 5000]);
        run(&mut vac, &window(), 15, &ProgressReporter::new()).unwrap();
        assert!(vac.samples().iter().all(|z| z.is_finite()));
        assert!(*vac.samples().last().unwrap() < 1e-300);
    }

    #[test]
    fn gaussian_weight_is_a_normal_density() {
        let sigma = 2.0;
        let peak = 1.0 / (sigma * (2.0 * PI).sqrt());
        assert!(f64_approx_equal(gaussian_weight(0, sigma), peak));
        assert!(f64_approx_equal(
            gaussian_weight(2, sigma),
            peak * (-0.5f64).exp()
        ));
    }

    #[test]
    fn oversized_padding_is_an_error_not_a_panic() {
        for padding_factor in [usize::MAX / 2 + 1, usize::MAX / 4] {
            let mut vac = VacSequence::new(vec![1.0, 0.5]);
            let result = run(&mut vac, &window(), padding_factor, &ProgressReporter::new());
            assert!(matches!(
                result,
                Err(EngineError::SequenceTooLong { lags: 2, .. })
            ));
            assert_eq!(vac.len(), 2);
        }
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let mut vac = VacSequence::new(Vec::new());
        assert!(matches!(
            run(&mut vac, &window(), 15, &ProgressReporter::new()),
            Err(EngineError::EmptySequence { .. })
        ));
    }
}
