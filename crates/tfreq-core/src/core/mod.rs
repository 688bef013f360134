//! # Core Module
//!
//! Data models, physical constants and file I/O shared by every stage of the
//! VDOS pipeline.
//!
//! - **Constants** ([`constants`]) - One table of physical constants and unit conversions
//! - **Data Models** ([`models`]) - Trajectories, autocorrelation sequences and spectra
//! - **File I/O** ([`io`]) - The `.vel` trajectory reader and the Z/FT report writers

pub mod constants;
pub mod io;
pub mod models;
