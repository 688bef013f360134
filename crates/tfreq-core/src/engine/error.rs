use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Cannot analyze an empty trajectory")]
    EmptyTrajectory,

    #[error("Stage '{stage}' received an empty sequence")]
    EmptySequence { stage: &'static str },

    #[error("Trajectory must span a positive time interval (duration: {duration})")]
    InvalidTimeSpan { duration: f64 },

    #[error(
        "Cannot pad {lags} lags by a factor of {padding_factor}: the sequence would not fit in memory"
    )]
    SequenceTooLong { lags: usize, padding_factor: usize },

    #[error("Degenerate normalization in stage '{stage}': divisor is {divisor}")]
    DegenerateNormalization { stage: &'static str, divisor: f64 },
}
