use nalgebra::Vector3;

/// The time-step index and simulation time that tag every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    /// The MD time-step index as written by the integrator.
    pub time_step: i64,
    /// The simulation time, in picoseconds.
    pub time: f64,
}

impl FrameHeader {
    pub fn new(time_step: i64, time: f64) -> Self {
        Self { time_step, time }
    }
}

/// A borrowed view of a single frame: its header and one velocity per atom.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    velocities: &'a [Vector3<f64>],
}

impl<'a> Frame<'a> {
    /// Returns the velocity of `atom`, or `None` if the index is out of range.
    pub fn velocity(&self, atom: usize) -> Option<&'a Vector3<f64>> {
        self.velocities.get(atom)
    }

    pub fn velocities(&self) -> &'a [Vector3<f64>] {
        self.velocities
    }
}

/// A velocity trajectory held entirely in memory.
///
/// Every frame carries exactly `n_atoms` velocity vectors. The vectors are
/// stored in one dense buffer laid out frame-major, so the velocity of atom
/// `a` in frame `t` lives at `t * n_atoms + a`. The trajectory exclusively
/// owns this buffer and hands out borrowed [`Frame`] views; it is never
/// mutated once loading has finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    n_atoms: usize,
    headers: Vec<FrameHeader>,
    velocities: Vec<Vector3<f64>>,
}

impl Trajectory {
    /// Creates an empty trajectory for systems of `n_atoms` atoms.
    pub fn new(n_atoms: usize) -> Self {
        Self {
            n_atoms,
            headers: Vec::new(),
            velocities: Vec::new(),
        }
    }

    /// Creates an empty trajectory with storage reserved for `n_frames` frames.
    ///
    /// The loader sizes its storage from a counting pre-pass, so the main
    /// read never reallocates.
    ///
    /// # Arguments
    ///
    /// * `n_atoms` - The fixed number of atoms per frame.
    /// * `n_frames` - The number of frames to reserve space for.
    pub fn with_capacity(n_atoms: usize, n_frames: usize) -> Self {
        Self {
            n_atoms,
            headers: Vec::with_capacity(n_frames),
            velocities: Vec::with_capacity(n_frames * n_atoms),
        }
    }

    /// Appends a frame to the end of the trajectory.
    ///
    /// # Arguments
    ///
    /// * `header` - The time-step index and simulation time of the frame.
    /// * `velocities` - One velocity vector per atom, in atom order.
    ///
    /// # Return
    ///
    /// Returns `Some(index)` of the new frame, or `None` if the number of
    /// velocities does not match the trajectory's atom count.
    pub fn push_frame(
        &mut self,
        header: FrameHeader,
        velocities: &[Vector3<f64>],
    ) -> Option<usize> {
        if velocities.len() != self.n_atoms {
            return None;
        }
        self.headers.push(header);
        self.velocities.extend_from_slice(velocities);
        Some(self.headers.len() - 1)
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn n_frames(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Retrieves a view of frame `index`, or `None` if it is out of range.
    pub fn frame(&self, index: usize) -> Option<Frame<'_>> {
        let header = *self.headers.get(index)?;
        let start = index * self.n_atoms;
        Some(Frame {
            header,
            velocities: &self.velocities[start..start + self.n_atoms],
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame<'_>> {
        (0..self.n_frames()).filter_map(move |i| self.frame(i))
    }

    /// Retrieves the velocity of `atom` in frame `frame`.
    ///
    /// # Return
    ///
    /// Returns `None` if either index is out of range.
    pub fn velocity(&self, frame: usize, atom: usize) -> Option<&Vector3<f64>> {
        if frame >= self.n_frames() || atom >= self.n_atoms {
            return None;
        }
        self.velocities.get(frame * self.n_atoms + atom)
    }

    /// Returns all velocities of frame `frame` as a slice, or `None` if out of range.
    pub fn frame_velocities(&self, frame: usize) -> Option<&[Vector3<f64>]> {
        if frame >= self.n_frames() {
            return None;
        }
        let start = frame * self.n_atoms;
        Some(&self.velocities[start..start + self.n_atoms])
    }

    pub fn first_header(&self) -> Option<&FrameHeader> {
        self.headers.first()
    }

    pub fn last_header(&self) -> Option<&FrameHeader> {
        self.headers.last()
    }

    /// Simulation time between the first and the last frame, in picoseconds.
    ///
    /// An empty trajectory has a duration of zero.
    pub fn duration(&self) -> f64 {
        match (self.first_header(), self.last_header()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }
}
