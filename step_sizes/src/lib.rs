//! Adaptive step size strategies for value-function reinforcement learning agents.
//!
//! A strategy turns the descent direction an agent proposes on each learning update into the
//! update actually applied to its weights, adapting its own state along the way.

mod error;
mod kind;
pub mod linalg;
mod params;
mod step;
mod strategies;
mod strategy;
mod testing;

pub use error::{Result, StepSizeErr};
pub use kind::StepSizeKind;
pub use params::ParamSet;
pub use step::{AgentView, Step};
pub use strategies::*;
pub use strategy::StepSize;
