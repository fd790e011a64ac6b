use ndarray::ArrayD;
use rand::RngCore;

use crate::{AgentView, ParamSet, Result, Step};

/// Defines how the descent direction proposed by an agent is turned into the actual update of
/// its weights.
///
/// A strategy is created empty, initialized once for a weight shape and then asked to rescale
/// exactly one descent direction per learning update. The adaptation state is private to each
/// implementation.
pub trait StepSize {
    /// The human readable name of the strategy.
    fn name(&self) -> &'static str;

    /// Allocates the adaptation state for weights of the given shape.
    ///
    /// Calling it again discards all the accumulated state.
    ///
    /// # Arguments
    /// * `shape` - The shape of the agent's weights.
    /// * `alpha` - The agent's base learning rate.
    /// * `params` - The agent's parameters, the resolved defaults are written back into it.
    ///
    /// # Returns
    /// An error if the strategy can't be used with this configuration.
    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()>;

    /// Rescales a descent direction, updating the adaptation state.
    ///
    /// # Arguments
    /// * `agent` - A view over the agent's discount, weights and traces.
    /// * `step` - The features, errors and descent direction of this update.
    ///
    /// # Returns
    /// The update to add to the weights, shaped like `step.descent_direction`, or an error if
    /// the strategy wasn't initialized or any input has the wrong shape.
    fn rescale(&mut self, agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>>;

    /// Picks the strategy's hyperparameters for a randomized search.
    ///
    /// Values already present in `params` are kept, missing ones are sampled from each
    /// parameter's range and inserted.
    ///
    /// # Arguments
    /// * `alpha` - The agent's base learning rate, some ranges depend on it.
    /// * `params` - Overrides on input, every tunable parameter on output.
    /// * `rng` - The random number generator to sample from.
    ///
    /// # Returns
    /// The resolved values, always in the same order. Empty if the strategy has no parameters.
    fn randomize_parameters(
        &self,
        _alpha: f64,
        _params: &mut ParamSet,
        _rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        Vec::new()
    }
}

impl<T: StepSize + ?Sized> StepSize for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        (**self).init(shape, alpha, params)
    }

    fn rescale(&mut self, agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        (**self).rescale(agent, step)
    }

    fn randomize_parameters(
        &self,
        alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        (**self).randomize_parameters(alpha, params, rng)
    }
}
