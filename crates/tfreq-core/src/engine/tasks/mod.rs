//! Pipeline stages that turn a velocity trajectory into a normalized spectrum.
//!
//! Each submodule is one stage. Stages only read from the stage before them:
//! the estimator produces a VAC sequence, the preprocessor pads and windows it
//! in place, and the transformer produces the spectrum.

pub mod autocorrelation;
pub mod preprocess;
pub mod transform;

use super::error::EngineError;

/// Divides every sample by sample 0, then sets sample 0 to exactly `1.0`.
pub(crate) fn normalize_to_first(
    samples: &mut [f64],
    stage: &'static str,
) -> Result<(), EngineError> {
    let Some((first, rest)) = samples.split_first_mut() else {
        return Err(EngineError::EmptySequence { stage });
    };
    let divisor = *first;
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(EngineError::DegenerateNormalization { stage, divisor });
    }
    for z in rest {
        *z /= divisor;
    }
    *first = 1.0;
    Ok(())
}
