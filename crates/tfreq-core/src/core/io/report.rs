//! Plain-text report writers for autocorrelation and spectrum data.
//!
//! Both reports are whitespace-separated columns, one sample per line, in the
//! fixed-width `printf` layouts that downstream plotting scripts expect.

use crate::core::constants::{PICOSECOND_SI, SPEED_OF_LIGHT_CM_S};
use crate::core::models::spectrum::{Spectrum, VacSequence};
use std::io::{self, Write};

/// Maps VAC sample indices to simulation times.
///
/// Sample `m` sits at `start + (stop - start) * m / lags`, where `lags` is the
/// unpadded sequence length, so padded samples extend past `stop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub start: f64,
    pub stop: f64,
    pub lags: usize,
}

impl TimeAxis {
    pub fn time_at(&self, m: usize) -> f64 {
        self.start + (self.stop - self.start) * m as f64 / self.lags as f64
    }
}

/// Maps spectrum bin indices to wavenumbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyAxis {
    /// Trajectory duration in the trajectory's time unit.
    pub duration: f64,
    pub padding_factor: usize,
    /// Length of one trajectory time unit in seconds.
    pub time_unit_seconds: f64,
    /// Speed of light in the length unit of the reported wavenumber, per second.
    pub speed_of_light: f64,
}

impl FrequencyAxis {
    /// Builds an axis for times in picoseconds and wavenumbers in cm^-1.
    pub fn wavenumbers(duration_ps: f64, padding_factor: usize) -> Self {
        Self {
            duration: duration_ps,
            padding_factor,
            time_unit_seconds: PICOSECOND_SI,
            speed_of_light: SPEED_OF_LIGHT_CM_S,
        }
    }

    pub fn frequency_at(&self, m: usize) -> f64 {
        m as f64
            / (self.speed_of_light
                * self.duration
                * self.padding_factor as f64
                * self.time_unit_seconds)
    }
}

/// Formats `value` like C's `%{width}.{precision}E`.
///
/// Rust's `{:E}` writes `1.5E3` where C writes `1.5E+03`; the exponent here
/// always carries a sign and at least two digits.
pub fn format_scientific(value: f64, width: usize, precision: usize) -> String {
    let raw = format!("{:.*E}", precision, value);
    let formatted = match raw.split_once('E') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}E{}{:02}", mantissa, sign, exp.unsigned_abs())
            }
            Err(_) => raw.clone(),
        },
        None => raw.clone(),
    };
    format!("{:>width$}", formatted, width = width)
}

/// Writes one `<time> <autocorrelation>` line per VAC sample, padding included.
pub fn write_vac_report<W: Write>(
    writer: &mut W,
    vac: &VacSequence,
    axis: &TimeAxis,
) -> io::Result<()> {
    for (m, &z) in vac.samples().iter().enumerate() {
        writeln!(
            writer,
            "{} {:14.9}",
            format_scientific(axis.time_at(m), 14, 9),
            z
        )?;
    }
    writer.flush()
}

/// Writes one `<frequency> <re> <im> <normalized power>` line per bin of
/// the Nyquist-limited half of `spectrum`.
pub fn write_spectrum_report<W: Write>(
    writer: &mut W,
    spectrum: &Spectrum,
    axis: &FrequencyAxis,
) -> io::Result<()> {
    for bin in spectrum.reported_bins() {
        writeln!(
            writer,
            "{} {} {} {}",
            format_scientific(axis.frequency_at(bin.index), 17, 9),
            format_scientific(bin.coefficient.re, 17, 9),
            format_scientific(bin.coefficient.im, 17, 9),
            format_scientific(bin.power, 17, 9),
        )?;
    }
    writer.flush()
}
