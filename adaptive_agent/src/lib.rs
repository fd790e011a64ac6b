//! Composition of value-function learning agents with adaptive step size strategies.

mod adaptive;
mod agent;
pub mod error;

pub use adaptive::{AdaptiveAgent, compose};
pub use agent::LearningAgent;
pub use error::{AgentErr, Result};
