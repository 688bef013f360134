//! Provides input/output functionality for trajectory files and analysis reports.
//!
//! Trajectory readers implement the [`traits::TrajectoryFile`] trait. Reports
//! are written through generic `std::io::Write` sinks so callers decide where
//! the data goes.

pub mod report;
pub mod traits;
pub mod vel;
