use rustfft::num_complex::Complex;
use std::collections::TryReserveError;

/// A velocity autocorrelation sequence.
///
/// The first `lags` samples are genuine estimates at lags `0..lags`; any
/// samples beyond that are zero padding added before the Fourier transform.
/// The VAC of a real signal is real, so samples are stored as `f64` and only
/// widened to complex when transformed.
#[derive(Debug, Clone, PartialEq)]
pub struct VacSequence {
    samples: Vec<f64>,
    lags: usize,
}

impl VacSequence {
    /// Wraps unpadded estimates; every sample counts as a genuine lag.
    pub fn new(samples: Vec<f64>) -> Self {
        let lags = samples.len();
        Self { samples, lags }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    /// Extends the sequence with exact zeros until it holds `len` samples.
    /// Shorter or equal targets leave the sequence untouched.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error if `len` samples cannot be stored.
    pub fn pad_to(&mut self, len: usize) -> Result<(), TryReserveError> {
        if len > self.samples.len() {
            self.samples.try_reserve_exact(len - self.samples.len())?;
            self.samples.resize(len, 0.0);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of genuine (unpadded) lags, `M`.
    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn to_complex(&self) -> Vec<Complex<f64>> {
        self.samples.iter().map(|&z| Complex::new(z, 0.0)).collect()
    }
}

/// One reported frequency bin of a [`Spectrum`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    pub index: usize,
    pub coefficient: Complex<f64>,
    /// `norm * |S[index]|^2`.
    pub power: f64,
}

/// Fourier coefficients of a VAC sequence and the factor that normalizes their power.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    coefficients: Vec<Complex<f64>>,
    normalization: f64,
}

impl Spectrum {
    pub fn new(coefficients: Vec<Complex<f64>>, normalization: f64) -> Self {
        Self {
            coefficients,
            normalization,
        }
    }

    pub fn coefficients(&self) -> &[Complex<f64>] {
        &self.coefficients
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Number of bins in the Nyquist-limited half, indices `0..=len/2`.
    pub fn reported_len(&self) -> usize {
        if self.coefficients.is_empty() {
            0
        } else {
            self.coefficients.len() / 2 + 1
        }
    }

    /// Normalized power `norm * |S[m]|^2`, or `None` if `m` is out of range.
    pub fn power(&self, m: usize) -> Option<f64> {
        self.coefficients
            .get(m)
            .map(|s| self.normalization * s.norm_sqr())
    }

    /// Iterates over the physically meaningful half of the spectrum.
    pub fn reported_bins(&self) -> impl Iterator<Item = SpectrumBin> + '_ {
        self.coefficients[..self.reported_len()]
            .iter()
            .enumerate()
            .map(|(index, &coefficient)| SpectrumBin {
                index,
                coefficient,
                power: self.normalization * coefficient.norm_sqr(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_to_appends_exact_zeros_and_keeps_lag_count() {
        let mut vac = VacSequence::new(vec![1.0, 0.5, 0.25]);
        vac.pad_to(6).unwrap();
        assert_eq!(vac.samples(), &[1.0, 0.5, 0.25, 0.0, 0.0, 0.0]);
        assert_eq!(vac.lags(), 3);
        assert_eq!(vac.len(), 6);
    }

    #[test]
    fn pad_to_shorter_length_is_a_no_op() {
        let mut vac = VacSequence::new(vec![1.0, 0.5]);
        vac.pad_to(1).unwrap();
        assert_eq!(vac.len(), 2);
    }

    #[test]
    fn pad_to_unrepresentable_length_is_an_error() {
        let mut vac = VacSequence::new(vec![1.0, 0.5]);
        assert!(vac.pad_to(usize::MAX / 4).is_err());
        assert_eq!(vac.samples(), &[1.0, 0.5]);
    }

    #[test]
    fn reported_half_includes_nyquist_bin() {
        let even = Spectrum::new(vec![Complex::new(1.0, 0.0); 8], 1.0);
        assert_eq!(even.reported_len(), 5);
        let odd = Spectrum::new(vec![Complex::new(1.0, 0.0); 7], 1.0);
        assert_eq!(odd.reported_len(), 4);
        assert_eq!(Spectrum::new(Vec::new(), 1.0).reported_len(), 0);
    }

    #[test]
    fn power_applies_normalization() {
        let spectrum = Spectrum::new(vec![Complex::new(3.0, 4.0), Complex::new(1.0, 0.0)], 0.04);
        assert!((spectrum.power(0).unwrap() - 1.0).abs() < 1e-12);
        assert!(spectrum.power(2).is_none());
        let bins: Vec<SpectrumBin> = spectrum.reported_bins().collect();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].index, 1);
    }
}
