//! Physical constants shared by the trajectory tools.
//!
//! All values are CODATA 2002 figures in SI units unless the name says
//! otherwise. The velocity-file producers work in atomic units, so the
//! atomic-unit conversions live here alongside the constants the spectrum
//! writer needs.

/// Planck constant in J s.
pub const H_PLANCK_SI: f64 = 6.6260693E-34;

/// Hartree energy in J.
pub const HARTREE_SI: f64 = 4.35974417E-18;

/// Boltzmann constant in J K^-1.
pub const K_BOLTZMANN_SI: f64 = 1.3806505E-23;

/// Bohr radius in m.
pub const BOHR_RADIUS_SI: f64 = 0.5291772108E-10;

/// Atomic mass unit in kg.
pub const AMU_SI: f64 = 1.66053886E-27;

/// Atomic unit of time in s.
pub const AU_SEC: f64 = 2.41888432E-17;

/// Speed of light in cm s^-1. Dividing a frequency in Hz by this yields cm^-1.
pub const SPEED_OF_LIGHT_CM_S: f64 = 2.99792458E10;

/// One picosecond in s. Velocity files carry simulation times in ps.
pub const PICOSECOND_SI: f64 = 1E-12;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_time_unit_matches_hbar_over_hartree() {
        let hbar = H_PLANCK_SI / (2.0 * std::f64::consts::PI);
        let derived = hbar / HARTREE_SI;
        assert!((derived - AU_SEC).abs() / AU_SEC < 1e-6);
    }
}
