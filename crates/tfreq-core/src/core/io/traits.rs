use crate::core::models::trajectory::Trajectory;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::Path;

/// Defines the interface for reading trajectory file formats.
///
/// Readers may need more than one pass over their input (for example to
/// size storage before filling it), so sources must be seekable as well as
/// buffered.
pub trait TrajectoryFile {
    /// Format-specific knobs that influence parsing.
    type Options;

    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a complete trajectory from a buffered, seekable reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The source to read from. It is rewound as needed.
    /// * `options` - Format-specific parsing options.
    ///
    /// # Return
    ///
    /// Returns the fully materialized trajectory.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from<R: BufRead + Seek>(
        reader: &mut R,
        options: &Self::Options,
    ) -> Result<Trajectory, Self::Error>;

    /// Reads a complete trajectory from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        options: &Self::Options,
    ) -> Result<Trajectory, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, options)
    }
}
