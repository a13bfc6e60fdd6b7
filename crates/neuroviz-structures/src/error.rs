use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for NeuroViz data operations.
///
/// Covers descriptor parsing, shape validation, and internal errors in the
/// structures crate. The graph crate wraps this in its own error type.
///
/// # Examples
/// ```
/// use neuroviz_structures::{NeurovizDataError, TensorShape};
///
/// assert!(TensorShape::new(&[28, 28, 1]).is_ok());
/// assert!(matches!(
///     TensorShape::new(&[]),
///     Err(NeurovizDataError::BadParameters(_))
/// ));
/// ```
#[derive(Debug)]
pub enum NeurovizDataError {
    /// Failed to deserialize a layer stack document
    DeserializationError(String),
    /// Invalid parameters provided to a function
    BadParameters(String),
    /// Internal error indicating a bug (please report)
    InternalError(String),
}

impl Display for NeurovizDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NeurovizDataError::DeserializationError(msg) => {
                write!(f, "Failed to Deserialize Layer Stack: {}", msg)
            }
            NeurovizDataError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            NeurovizDataError::InternalError(msg) => {
                write!(f, "Internal Error, please raise an issue on Github: {}", msg)
            }
        }
    }
}
impl Error for NeurovizDataError {}
