//! # Engine Module
//!
//! This module implements the numerical stages of the VDOS computation.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Padding, smoothing, normalization and unit parameters
//! - **Pipeline Stages** ([`tasks`]) - Autocorrelation, preprocessing and Fourier transform
//! - **Progress Monitoring** ([`progress`]) - Progress events delivered to an optional callback
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! All arithmetic is carried out in `f64`. The Gaussian window and the
//! transform are sensitive to precision, so no stage is generic over it.

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
