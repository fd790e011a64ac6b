use std::{error::Error, fmt};

/// The result type used across the step size crate.
pub type Result<T> = std::result::Result<T, StepSizeErr>;

/// Errors produced by step size strategies.
///
/// Numerical degeneracies are never reported here, every strategy falls back to a safe value
/// instead. These variants only describe programming errors on the caller's side.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSizeErr {
    /// An array handed to the strategy doesn't match the shape it was initialized with.
    ShapeMismatch {
        /// Which input had the wrong shape (e.g. "phi_t", "traces").
        what: &'static str,
        /// Observed shape.
        got: Vec<usize>,
        /// Shape given at initialization.
        expected: Vec<usize>,
    },

    /// `rescale` was called before `init`.
    NotInitialized(&'static str),

    /// No registered strategy goes by the given name.
    UnknownStrategy(String),
}

impl fmt::Display for StepSizeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSizeErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {what}: got {got:?}, expected {expected:?}"
            ),
            StepSizeErr::NotInitialized(name) => {
                write!(f, "the {name} step size was used before being initialized")
            }
            StepSizeErr::UnknownStrategy(name) => write!(f, "unknown step size strategy '{name}'"),
        }
    }
}

impl Error for StepSizeErr {}

/// Checks that `got` matches the `expected` shape.
///
/// # Arguments
/// * `what` - The name of the checked input, used in the error.
/// * `got` - The shape of the input.
/// * `expected` - The shape the strategy was initialized with.
///
/// # Returns
/// A `ShapeMismatch` error if both shapes differ.
pub(crate) fn check_shape(what: &'static str, got: &[usize], expected: &[usize]) -> Result<()> {
    if got != expected {
        return Err(StepSizeErr::ShapeMismatch {
            what,
            got: got.to_vec(),
            expected: expected.to_vec(),
        });
    }

    Ok(())
}
