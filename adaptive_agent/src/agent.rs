use ndarray::{ArrayD, ArrayViewD};
use rand::RngCore;
use step_sizes::{AgentView, ParamSet, Step};

use crate::Result;

/// A value-function learning agent whose weights are updated along a descent direction.
///
/// Implementors compute the descent direction and apply updates, the scaling in between is
/// left to `rescale_update` so that it can be swapped by an `AdaptiveAgent`.
pub trait LearningAgent {
    /// Whatever the agent learns from in a single step (e.g. features, reward and next features).
    type Transition;

    /// The human readable name of the agent.
    fn name(&self) -> String;

    /// The agent's base learning rate.
    fn alpha(&self) -> f64;

    /// The agent's discount factor.
    fn gamma(&self) -> f64;

    fn weights(&self) -> ArrayViewD<'_, f64>;

    /// The agent's eligibility traces, shaped like the weights.
    fn traces(&self) -> ArrayViewD<'_, f64>;

    /// A read-only view over the state step size strategies may inspect.
    fn view(&self) -> AgentView<'_> {
        AgentView::new(self.gamma(), self.weights(), self.traces())
    }

    /// Picks the agent's hyperparameters for a randomized search.
    ///
    /// # Arguments
    /// * `params` - Overrides on input, every tunable parameter on output.
    /// * `rng` - The random number generator to sample from.
    ///
    /// # Returns
    /// The resolved values, always in the same order.
    fn randomize_parameters(&mut self, params: &mut ParamSet, rng: &mut dyn RngCore) -> Vec<f64>;

    /// Computes the un-scaled update for a transition, updating the traces along the way.
    fn descent(&mut self, transition: &Self::Transition) -> Result<Step>;

    /// Turns a descent direction into the update applied to the weights.
    ///
    /// Defaults to a fixed step of size `alpha`.
    fn rescale_update(&mut self, step: &Step) -> Result<ArrayD<f64>> {
        Ok(step.scaled(self.alpha()))
    }

    /// Adds `update` to the weights.
    fn apply_update(&mut self, update: &ArrayD<f64>) -> Result<()>;

    /// Performs a single learning step: computes the descent direction, rescales it exactly once
    /// and applies the result.
    fn learn(&mut self, transition: &Self::Transition) -> Result<()> {
        let step = self.descent(transition)?;
        let update = self.rescale_update(&step)?;
        self.apply_update(&update)
    }
}
