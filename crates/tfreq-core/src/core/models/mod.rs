//! # Core Models Module
//!
//! Data structures passed between the pipeline stages.
//!
//! - [`trajectory`] - Velocity trajectories held in a dense, frame-major buffer
//! - [`spectrum`] - Autocorrelation sequences and their Fourier spectra

pub mod spectrum;
pub mod trajectory;
