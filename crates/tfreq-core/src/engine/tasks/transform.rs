use crate::core::models::spectrum::{Spectrum, VacSequence};
use crate::engine::config::Normalization;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use tracing::{debug, info, instrument};

const STAGE: &str = "spectrum normalization";

/// Computes the forward DFT of a preprocessed VAC sequence and its power normalization.
///
/// The transform is unscaled, `S[k] = sum_j Z[j] exp(-2 pi i j k / n)`. The
/// returned [`Spectrum`] carries a factor `norm` such that `norm * |S[k]|^2`
/// is the reported power:
///
/// - [`Normalization::Peak`]: the largest power among bins `0..=n/2` is 1.
/// - [`Normalization::TotalPower`]: `norm = 1 / (sum_k |S[k]|^2 * duration_seconds / M)`
///   over all bins, where `M` is the number of genuine lags.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateNormalization`] when the normalization
/// divisor is zero or not finite, e.g. for an all-zero input sequence.
#[instrument(skip_all, name = "transform_task")]
pub fn run(
    vac: &VacSequence,
    normalization: Normalization,
    duration_seconds: f64,
    reporter: &ProgressReporter,
) -> Result<Spectrum, EngineError> {
    if vac.is_empty() {
        return Err(EngineError::EmptySequence { stage: STAGE });
    }

    reporter.report(Progress::PhaseStart {
        name: "Fourier transform",
    });

    let mut buffer = vac.to_complex();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    debug!(len = buffer.len(), "Forward FFT complete.");

    let divisor = match normalization {
        Normalization::Peak => peak_power(&buffer),
        Normalization::TotalPower => {
            total_power(&buffer) * duration_seconds / vac.lags() as f64
        }
    };
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(EngineError::DegenerateNormalization {
            stage: STAGE,
            divisor,
        });
    }
    info!(?normalization, divisor, "Normalized power spectrum.");

    reporter.report(Progress::PhaseFinish);
    Ok(Spectrum::new(buffer, 1.0 / divisor))
}

/// Largest `|S[k]|^2` over the Nyquist-limited half, `k in 0..=n/2`.
pub fn peak_power(coefficients: &[Complex<f64>]) -> f64 {
    let half = coefficients.len() / 2;
    coefficients
        .iter()
        .take(half + 1)
        .map(Complex::norm_sqr)
        .fold(0.0, f64::max)
}

/// `sum_k |S[k]|^2` over every bin.
pub fn total_power(coefficients: &[Complex<f64>]) -> f64 {
    coefficients.iter().map(Complex::norm_sqr).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::WindowConfig;
    use crate::engine::tasks::preprocess;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn damped_cosine(lags: usize) -> VacSequence {
        let samples = (0..lags)
            .map(|m| (0.6 * m as f64).cos() * (-0.05 * m as f64).exp())
            .collect();
        VacSequence::new(samples)
    }

    #[test]
    fn peak_normalized_power_has_unit_maximum() {
        let mut vac = damped_cosine(40);
        preprocess::run(&mut vac, &WindowConfig::default(), 15, &ProgressReporter::new())
            .unwrap();
        let spectrum = run(&vac, Normalization::Peak, 1.0e-12, &ProgressReporter::new()).unwrap();

        assert_eq!(spectrum.len(), 600);
        let max = spectrum
            .reported_bins()
            .map(|bin| bin.power)
            .fold(f64::MIN, f64::max);
        assert!(f64_approx_equal(max, 1.0));
    }

    #[test]
    fn unit_impulse_has_flat_spectrum() {
        let mut vac = VacSequence::new(vec![1.0]);
        vac.pad_to(8).unwrap();
        let spectrum = run(&vac, Normalization::Peak, 1.0, &ProgressReporter::new()).unwrap();
        for bin in spectrum.reported_bins() {
            assert!(f64_approx_equal(bin.coefficient.re, 1.0));
            assert!(f64_approx_equal(bin.coefficient.im, 0.0));
            assert!(f64_approx_equal(bin.power, 1.0));
        }
    }

    #[test]
    fn transform_matches_direct_dft() {
        let vac = VacSequence::new(vec![1.0, 0.5, -0.25, 0.125, 0.0]);
        let spectrum = run(&vac, Normalization::Peak, 1.0, &ProgressReporter::new()).unwrap();
        let n = vac.len();
        for k in 0..n {
            let expected: Complex<f64> = vac
                .samples()
                .iter()
                .enumerate()
                .map(|(j, &z)| {
                    let angle = -2.0 * std::f64::consts::PI * (j * k) as f64 / n as f64;
                    Complex::from_polar(z, angle)
                })
                .sum();
            let got = spectrum.coefficients()[k];
            assert!(f64_approx_equal(got.re, expected.re));
            assert!(f64_approx_equal(got.im, expected.im));
        }
    }

    #[test]
    fn total_power_normalization_integrates_to_one() {
        let vac = VacSequence::new(vec![1.0, 0.5, 0.25, 0.0]);
        let duration = 2.0;
        let spectrum = run(
            &vac,
            Normalization::TotalPower,
            duration,
            &ProgressReporter::new(),
        )
        .unwrap();
        let integral: f64 = (0..spectrum.len())
            .map(|k| spectrum.power(k).unwrap())
            .sum::<f64>()
            * duration
            / vac.lags() as f64;
        assert!(f64_approx_equal(integral, 1.0));
    }

    #[test]
    fn all_zero_sequence_is_a_degenerate_normalization() {
        let vac = VacSequence::new(vec![0.0; 16]);
        let result = run(&vac, Normalization::Peak, 1.0, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::DegenerateNormalization {
                stage: "spectrum normalization",
                ..
            })
        ));
    }

    #[test]
    fn peak_power_ignores_upper_half() {
        let coefficients = vec![
            Complex::new(1.0, 0.0),
            Complex::new(2.0, 0.0),
            Complex::new(0.0, 0.0),
            Complex::new(10.0, 0.0),
        ];
        assert_eq!(peak_power(&coefficients), 4.0);
        assert_eq!(total_power(&coefficients), 105.0);
    }
}
