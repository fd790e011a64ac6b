use std::{error::Error, fmt};

use step_sizes::StepSizeErr;

/// The adaptive agent module's result type.
pub type Result<T> = std::result::Result<T, AgentErr>;

/// Failures while learning with a composed agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentErr {
    /// The step size strategy rejected the update.
    StepSize(StepSizeErr),

    /// An input handed to the base agent has the wrong shape.
    ShapeMismatch {
        what: &'static str,
        got: Vec<usize>,
        expected: Vec<usize>,
    },

    /// An input is invalid for domain reasons.
    InvalidInput(&'static str),
}

impl fmt::Display for AgentErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentErr::StepSize(e) => write!(f, "step size error: {e}"),
            AgentErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {what}: got {got:?}, expected {expected:?}"
            ),
            AgentErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl Error for AgentErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AgentErr::StepSize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StepSizeErr> for AgentErr {
    fn from(value: StepSizeErr) -> Self {
        Self::StepSize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_step_size_errors() {
        let err: AgentErr = StepSizeErr::NotInitialized("GHS").into();

        assert_eq!(err, AgentErr::StepSize(StepSizeErr::NotInitialized("GHS")));
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("the GHS step size was used before being initialized".to_string())
        );
    }

    #[test]
    fn own_errors_have_no_source() {
        let err = AgentErr::ShapeMismatch {
            what: "phi_t",
            got: vec![2],
            expected: vec![3],
        };

        assert!(err.source().is_none());
        assert_eq!(
            err.to_string(),
            "shape mismatch for phi_t: got [2], expected [3]"
        );
    }
}
