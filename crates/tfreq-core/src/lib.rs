//! # tfreq Core Library
//!
//! Computes the velocity autocorrelation function (VAC) of a molecular-dynamics
//! trajectory and, through its Fourier transform, the vibrational density of
//! states (VDOS).
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture with data flowing strictly
//! forward through it.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Trajectory`,
//!   `VacSequence`, `Spectrum`), the shared physical constants, and file I/O for
//!   velocity trajectories and the two text reports.
//!
//! - **[`engine`]: The Logic Core.** Configuration, error types, progress
//!   reporting, and the pipeline stages: the autocorrelation estimator, the
//!   padding and Gaussian-smoothing preprocessor, and the Fourier transformer.
//!
//! - **[`workflows`]: The Public API.** Chains the engine stages into the
//!   complete VAC → VDOS computation on a loaded trajectory.

pub mod core;
pub mod engine;
pub mod workflows;
