use ndarray::{ArrayD, ArrayViewD};

use crate::error::{Result, check_shape};

/// Everything a base agent computed for a single learning update, before any step size was
/// applied to it.
#[derive(Debug, Clone)]
pub struct Step {
    /// Active features at time `t`.
    pub phi_t: ArrayD<f64>,
    /// Active features at time `t + 1`.
    pub phi_tp: ArrayD<f64>,
    /// The temporal difference error.
    pub delta: f64,
    pub reward: f64,
    /// The un-scaled update proposed by the agent, conventionally the negative gradient.
    pub descent_direction: ArrayD<f64>,
}

impl Step {
    /// Creates a new `Step`.
    ///
    /// # Arguments
    /// * `phi_t` - Features at time `t`.
    /// * `phi_tp` - Features at time `t + 1`.
    /// * `delta` - The temporal difference error.
    /// * `reward` - The observed reward.
    /// * `descent_direction` - The un-scaled update.
    ///
    /// # Returns
    /// A new `Step` instance.
    pub fn new(
        phi_t: ArrayD<f64>,
        phi_tp: ArrayD<f64>,
        delta: f64,
        reward: f64,
        descent_direction: ArrayD<f64>,
    ) -> Self {
        Self {
            phi_t,
            phi_tp,
            delta,
            reward,
            descent_direction,
        }
    }

    /// Checks that every array in this step has the `expected` shape.
    ///
    /// # Returns
    /// A `ShapeMismatch` error naming the first offending array.
    pub fn check_shape(&self, expected: &[usize]) -> Result<()> {
        check_shape("phi_t", self.phi_t.shape(), expected)?;
        check_shape("phi_tp", self.phi_tp.shape(), expected)?;
        check_shape(
            "descent_direction",
            self.descent_direction.shape(),
            expected,
        )
    }

    /// The descent direction scaled by a single scalar step size.
    pub fn scaled(&self, step_size: f64) -> ArrayD<f64> {
        self.descent_direction.mapv(|d| step_size * d)
    }

    /// Computes `gamma * phi_tp - phi_t`, the feature difference of a linear TD update.
    pub(crate) fn td_features(&self, gamma: f64) -> ArrayD<f64> {
        let mut td = self.phi_tp.mapv(|phi| gamma * phi);
        td -= &self.phi_t;
        td
    }
}

/// A read-only view over the state of the base agent some strategies need.
#[derive(Debug, Clone)]
pub struct AgentView<'a> {
    /// The agent's discount factor.
    pub gamma: f64,
    pub weights: ArrayViewD<'a, f64>,
    /// The agent's eligibility traces.
    pub traces: ArrayViewD<'a, f64>,
}

impl<'a> AgentView<'a> {
    /// Creates a new `AgentView`.
    pub fn new(gamma: f64, weights: ArrayViewD<'a, f64>, traces: ArrayViewD<'a, f64>) -> Self {
        Self {
            gamma,
            weights,
            traces,
        }
    }

    /// Checks that the agent's weights and traces have the `expected` shape.
    pub fn check_shape(&self, expected: &[usize]) -> Result<()> {
        check_shape("weights", self.weights.shape(), expected)?;
        check_shape("traces", self.traces.shape(), expected)
    }
}
