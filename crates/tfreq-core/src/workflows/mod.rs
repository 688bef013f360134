//! # Workflows Module
//!
//! Top-level entry points that run the engine stages end to end.
//!
//! - **VDOS Workflow** ([`vdos`]) - Velocity autocorrelation, smoothing and
//!   Fourier transform of a loaded trajectory, with report writing helpers.

pub mod vdos;
