use crate::core::io::traits::TrajectoryFile;
use crate::core::models::trajectory::{FrameHeader, Trajectory};
use nalgebra::Vector3;
use std::io::{self, BufRead, Seek};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum VelError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: VelParseErrorKind,
    },
    #[error("Atom count must be at least 1 (got {0})")]
    InvalidAtomCount(usize),
    #[error("Velocity file contains no frames")]
    Empty,
}

#[derive(Debug, Error, PartialEq)]
pub enum VelParseErrorKind {
    #[error("Invalid time-step index '{value}'")]
    InvalidInt { value: String },
    #[error("Invalid {field} value '{value}'")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Frame {frame} ends before all of its {expected} values were read")]
    TruncatedFrame { frame: usize, expected: usize },
    #[error(
        "Found {components} velocity components before the second frame header, which is not a positive multiple of 3"
    )]
    BadAtomCount { components: usize },
}

/// Options for reading `.vel` files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VelReadOptions {
    /// Atoms per frame. When `None` the count is sniffed from the first frame.
    pub atoms: Option<usize>,
}

/// Frame count and time bounds gathered by the counting pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelSummary {
    pub n_atoms: usize,
    pub n_frames: usize,
    pub first: FrameHeader,
    pub last: FrameHeader,
}

struct Token {
    line: usize,
    text: String,
}

struct TokenReader<R> {
    reader: R,
    pending: std::vec::IntoIter<String>,
    line: usize,
}

impl<R: BufRead> TokenReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new().into_iter(),
            line: 0,
        }
    }

    fn next(&mut self) -> Result<Option<Token>, VelError> {
        loop {
            if let Some(text) = self.pending.next() {
                return Ok(Some(Token {
                    line: self.line,
                    text,
                }));
            }
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            self.pending = buf
                .split_whitespace()
                .map(str::to_owned)
                .collect::<Vec<_>>()
                .into_iter();
        }
    }
}

fn parse_time_step(token: &Token) -> Result<i64, VelError> {
    token.text.parse().map_err(|_| VelError::Parse {
        line: token.line,
        kind: VelParseErrorKind::InvalidInt {
            value: token.text.clone(),
        },
    })
}

fn parse_float(token: &Token, field: &'static str) -> Result<f64, VelError> {
    match token.text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(VelError::Parse {
            line: token.line,
            kind: VelParseErrorKind::InvalidFloat {
                field,
                value: token.text.clone(),
            },
        }),
    }
}

fn truncated(line: usize, frame: usize, n_atoms: usize) -> VelError {
    VelError::Parse {
        line,
        kind: VelParseErrorKind::TruncatedFrame {
            frame,
            expected: 2 + 3 * n_atoms,
        },
    }
}

/// Reads `<time_step> <time>`. Returns `Ok(None)` on a clean end of input.
fn read_header<R: BufRead>(
    tokens: &mut TokenReader<R>,
    frame: usize,
    n_atoms: usize,
) -> Result<Option<FrameHeader>, VelError> {
    let Some(step_token) = tokens.next()? else {
        return Ok(None);
    };
    let time_step = parse_time_step(&step_token)?;
    let time_token = tokens
        .next()?
        .ok_or_else(|| truncated(step_token.line, frame, n_atoms))?;
    let time = parse_float(&time_token, "simulation time")?;
    Ok(Some(FrameHeader::new(time_step, time)))
}

fn read_velocity<R: BufRead>(
    tokens: &mut TokenReader<R>,
    frame: usize,
    n_atoms: usize,
) -> Result<Vector3<f64>, VelError> {
    let mut v = Vector3::zeros();
    for (axis, field) in ["vx", "vy", "vz"].into_iter().enumerate() {
        let token = tokens
            .next()?
            .ok_or_else(|| truncated(tokens.line, frame, n_atoms))?;
        v[axis] = parse_float(&token, field)?;
    }
    Ok(v)
}

/// A frame header's time-step token is the only integer in the format.
fn looks_like_time_step(token: &str) -> bool {
    token.parse::<i64>().is_ok()
}

/// Infers the number of atoms per frame from the layout of the first frame.
///
/// The first header is skipped, then tokens are consumed until one parses as
/// a plain integer, which is taken to be the next frame's time-step index (or
/// until the end of input for a single-frame file). The number of tokens
/// consumed divided by three is the atom count.
///
/// The stop rule is "parses as an integer", not "has no decimal point": a
/// component such as `1e-05` has no `.` but is still read as a velocity.
///
/// This is format sniffing, not parsing: a velocity component written as an
/// integer (`0` rather than `0.0`) ends the first frame early and yields a
/// wrong count or a [`VelParseErrorKind::BadAtomCount`] error. Pass an
/// explicit count through [`VelReadOptions::atoms`] for such files.
///
/// # Errors
///
/// Returns [`VelError::Empty`] if there is no header, or a parse error if the
/// header is malformed or the component count is not a positive multiple of 3.
pub fn sniff_atom_count<R: BufRead>(reader: &mut R) -> Result<usize, VelError> {
    let mut tokens = TokenReader::new(reader);
    if read_header(&mut tokens, 0, 0)?.is_none() {
        return Err(VelError::Empty);
    }

    let mut components = 0usize;
    let mut last_line = tokens.line;
    while let Some(token) = tokens.next()? {
        if looks_like_time_step(&token.text) {
            break;
        }
        components += 1;
        last_line = token.line;
    }

    if components == 0 || components % 3 != 0 {
        return Err(VelError::Parse {
            line: last_line,
            kind: VelParseErrorKind::BadAtomCount { components },
        });
    }
    debug!(components, "Sniffed velocity components in the first frame.");
    Ok(components / 3)
}

/// Reader for the plain-text `.vel` velocity trajectory format.
///
/// Each frame is a `<int time_step> <float time>` header followed by three
/// whitespace-separated floats per atom. Line breaks carry no meaning.
pub struct VelFile;

impl VelFile {
    /// Counts frames without retaining any values, validating every token.
    ///
    /// The reader is consumed up to end of input; callers rewind it before a
    /// second pass.
    pub fn scan<R: BufRead>(reader: &mut R, n_atoms: usize) -> Result<VelSummary, VelError> {
        let mut tokens = TokenReader::new(reader);
        let mut n_frames = 0usize;
        let mut first = None;
        let mut last = None;

        while let Some(header) = read_header(&mut tokens, n_frames, n_atoms)? {
            for _ in 0..n_atoms {
                read_velocity(&mut tokens, n_frames, n_atoms)?;
            }
            first.get_or_insert(header);
            last = Some(header);
            n_frames += 1;
        }

        match (first, last) {
            (Some(first), Some(last)) => Ok(VelSummary {
                n_atoms,
                n_frames,
                first,
                last,
            }),
            _ => Err(VelError::Empty),
        }
    }

    fn resolve_atom_count<R: BufRead + Seek>(
        reader: &mut R,
        options: &VelReadOptions,
    ) -> Result<usize, VelError> {
        match options.atoms {
            Some(0) => Err(VelError::InvalidAtomCount(0)),
            Some(n) => {
                debug!(n_atoms = n, "Using explicit atom count; skipping format sniffing.");
                Ok(n)
            }
            None => {
                let n = sniff_atom_count(reader)?;
                reader.rewind()?;
                Ok(n)
            }
        }
    }
}

impl TrajectoryFile for VelFile {
    type Options = VelReadOptions;
    type Error = VelError;

    #[instrument(skip_all, name = "vel_reader")]
    fn read_from<R: BufRead + Seek>(
        reader: &mut R,
        options: &Self::Options,
    ) -> Result<Trajectory, Self::Error> {
        let n_atoms = Self::resolve_atom_count(reader, options)?;

        let summary = Self::scan(reader, n_atoms)?;
        reader.rewind()?;
        info!(
            n_atoms,
            n_frames = summary.n_frames,
            start_time = summary.first.time,
            stop_time = summary.last.time,
            start_step = summary.first.time_step,
            stop_step = summary.last.time_step,
            "Scanned velocity file."
        );

        let mut trajectory = Trajectory::with_capacity(n_atoms, summary.n_frames);
        let mut tokens = TokenReader::new(&mut *reader);
        let mut velocities = Vec::with_capacity(n_atoms);

        for frame in 0..summary.n_frames {
            let header = read_header(&mut tokens, frame, n_atoms)?
                .ok_or_else(|| truncated(tokens.line, frame, n_atoms))?;
            velocities.clear();
            for _ in 0..n_atoms {
                velocities.push(read_velocity(&mut tokens, frame, n_atoms)?);
            }
            trajectory.push_frame(header, &velocities);
        }

        debug!(
            n_frames = trajectory.n_frames(),
            "Velocity data loaded into memory."
        );
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const TWO_ATOMS_THREE_FRAMES: &str = "\
10 0.000
  1.0 0.0 0.0
  0.0 2.0 0.0
11 0.010
  0.5 0.0 0.0
  0.0 1.5 0.0
12 0.020
  -1.0e-01 0.0 0.0
  0.0 1.0 2.5E+00
";

    fn read(content: &str, options: VelReadOptions) -> Result<Trajectory, VelError> {
        let mut cursor = Cursor::new(content.as_bytes());
        VelFile::read_from(&mut cursor, &options)
    }

    #[test]
    fn sniffs_atom_count_from_first_frame() {
        let mut cursor = Cursor::new(TWO_ATOMS_THREE_FRAMES.as_bytes());
        assert_eq!(sniff_atom_count(&mut cursor).unwrap(), 2);
    }

    #[test]
    fn sniffing_reads_exponent_without_decimal_point_as_velocity() {
        let content = "1 0.5\n1e-05 2E3 -4e+1\n2 0.6\n1.0 2.0 3.0\n";
        let mut cursor = Cursor::new(content.as_bytes());
        assert_eq!(sniff_atom_count(&mut cursor).unwrap(), 1);
    }

    #[test]
    fn sniffs_atom_count_in_single_frame_file() {
        let mut cursor = Cursor::new("1 0.5\n1.0 2.0 3.0\n".as_bytes());
        assert_eq!(sniff_atom_count(&mut cursor).unwrap(), 1);
    }

    #[test]
    fn sniffing_stops_at_integer_velocity_component() {
        let mut cursor = Cursor::new("1 0.5\n1.0 0 3.0\n2 0.6\n1.0 0.0 3.0\n".as_bytes());
        let err = sniff_atom_count(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            VelError::Parse {
                line: 2,
                kind: VelParseErrorKind::BadAtomCount { components: 1 }
            }
        ));
    }

    #[test]
    fn reads_all_frames_and_velocities() {
        let trajectory = read(TWO_ATOMS_THREE_FRAMES, VelReadOptions::default()).unwrap();
        assert_eq!(trajectory.n_atoms(), 2);
        assert_eq!(trajectory.n_frames(), 3);
        assert_eq!(trajectory.first_header().unwrap().time_step, 10);
        assert_eq!(trajectory.last_header().unwrap().time_step, 12);
        assert!((trajectory.duration() - 0.02).abs() < 1e-12);
        assert_eq!(
            trajectory.velocity(2, 0),
            Some(&Vector3::new(-0.1, 0.0, 0.0))
        );
        assert_eq!(
            trajectory.velocity(2, 1),
            Some(&Vector3::new(0.0, 1.0, 2.5))
        );
    }

    #[test]
    fn explicit_atom_count_skips_sniffing() {
        let content = "1 0.0\n1 0 0\n2 0.1\n0 1 0\n";
        let trajectory = read(content, VelReadOptions { atoms: Some(1) }).unwrap();
        assert_eq!(trajectory.n_frames(), 2);
        assert_eq!(
            trajectory.velocity(1, 0),
            Some(&Vector3::new(0.0, 1.0, 0.0))
        );
    }

    #[test]
    fn zero_explicit_atom_count_is_rejected() {
        let err = read(TWO_ATOMS_THREE_FRAMES, VelReadOptions { atoms: Some(0) }).unwrap_err();
        assert!(matches!(err, VelError::InvalidAtomCount(0)));
    }

    #[test]
    fn malformed_float_reports_line_and_token() {
        let content = "1 0.0\n1.0 0.0 0.0\n2 0.1\n1.0 abc 0.0\n";
        let err = read(content, VelReadOptions::default()).unwrap_err();
        match err {
            VelError::Parse { line, kind } => {
                assert_eq!(line, 4);
                assert_eq!(
                    kind,
                    VelParseErrorKind::InvalidFloat {
                        field: "vy",
                        value: "abc".into()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_time_step_is_a_parse_error() {
        let content = "1 0.0\n1.0 0.0 0.0\n2x 0.1\n1.0 0.0 0.0\n";
        let err = read(content, VelReadOptions { atoms: Some(1) }).unwrap_err();
        assert!(matches!(
            err,
            VelError::Parse {
                line: 3,
                kind: VelParseErrorKind::InvalidInt { .. }
            }
        ));
    }

    #[test]
    fn truncated_final_frame_is_a_parse_error() {
        let content = "1 0.0\n1.0 0.0 0.0\n2 0.1\n1.0 0.0\n";
        let err = read(content, VelReadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            VelError::Parse {
                kind: VelParseErrorKind::TruncatedFrame { frame: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let content = "1 0.0\n1.0 NaN 0.0\n";
        let err = read(content, VelReadOptions { atoms: Some(1) }).unwrap_err();
        assert!(matches!(err, VelError::Parse { line: 2, .. }));
    }

    #[test]
    fn empty_input_is_reported() {
        let err = read("   \n\n", VelReadOptions::default()).unwrap_err();
        assert!(matches!(err, VelError::Empty));
        let err = read("", VelReadOptions { atoms: Some(2) }).unwrap_err();
        assert!(matches!(err, VelError::Empty));
    }

    #[test]
    fn scan_reports_bounds_without_retaining_values() {
        let mut cursor = Cursor::new(TWO_ATOMS_THREE_FRAMES.as_bytes());
        let summary = VelFile::scan(&mut cursor, 2).unwrap();
        assert_eq!(summary.n_frames, 3);
        assert_eq!(summary.first, FrameHeader::new(10, 0.0));
        assert_eq!(summary.last, FrameHeader::new(12, 0.02));
    }

    #[test]
    fn read_from_path_handles_missing_and_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.vel");
        let err = VelFile::read_from_path(&missing, &VelReadOptions::default()).unwrap_err();
        assert!(matches!(err, VelError::Io(_)));

        let path = dir.path().join("case.vel");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TWO_ATOMS_THREE_FRAMES.as_bytes()).unwrap();
        drop(file);

        let trajectory = VelFile::read_from_path(&path, &VelReadOptions::default()).unwrap();
        assert_eq!(trajectory.n_frames(), 3);
    }
}
