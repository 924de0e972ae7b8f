//! Errors in the library.
use thiserror::Error;

/// Errors raised by this library.
///
/// Failures of environment implementations propagate unchanged as
/// [`anyhow::Error`]; this taxonomy covers the locally meaningful cases.
#[derive(Debug, Error)]
pub enum StrideError {
    /// The wrapper was built without training environments (`n_envs == 0`)
    /// and a training-side operation was invoked.
    #[error("No training environments were configured")]
    NoTrainingEnvs,

    /// A batch dimension disagrees with the configured one.
    #[error("Expected dimension {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension required by the configuration.
        expected: usize,
        /// The dimension actually received.
        actual: usize,
    },

    /// The key was not found in a record.
    #[error("Key {0} is not in the record")]
    RecordKeyError(String),

    /// A record value had an unexpected type.
    #[error("Record value type mismatch, expected {0}")]
    RecordValueTypeError(String),
}
