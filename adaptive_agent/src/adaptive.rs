use log::debug;
use ndarray::{ArrayD, ArrayViewD};
use rand::RngCore;
use step_sizes::{ParamSet, Step, StepSize, StepSizeKind};

use crate::{LearningAgent, Result};

/// A base agent whose weight updates are rescaled by a step size strategy.
///
/// Behaves exactly like the wrapped agent except for `rescale_update`, which is delegated to the
/// strategy. `init` must be called before learning.
#[derive(Debug)]
pub struct AdaptiveAgent<A, S> {
    agent: A,
    step_size: S,
}

impl<A: LearningAgent, S: StepSize> AdaptiveAgent<A, S> {
    /// Creates a new `AdaptiveAgent`.
    ///
    /// # Arguments
    /// * `agent` - The base agent, its weights must already have their final shape.
    /// * `step_size` - An uninitialized strategy.
    ///
    /// # Returns
    /// A new `AdaptiveAgent` instance.
    pub fn new(agent: A, step_size: S) -> Self {
        Self { agent, step_size }
    }

    /// Initializes the strategy for the agent's weights and learning rate.
    ///
    /// Calling it again restarts the strategy from scratch.
    ///
    /// # Arguments
    /// * `params` - The agent's parameters, the strategy's resolved defaults are written back.
    ///
    /// # Returns
    /// An error if the strategy can't be used with this agent.
    pub fn init(&mut self, params: &mut ParamSet) -> Result<()> {
        let shape = self.agent.weights().shape().to_vec();
        let alpha = self.agent.alpha();
        let size: usize = shape.iter().product();

        debug!(strategy = self.step_size.name(), alpha = alpha, size = size; "initializing step size");
        self.step_size.init(&shape, alpha, params)?;
        Ok(())
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    pub fn step_size(&self) -> &S {
        &self.step_size
    }

    /// Splits the composed agent back into its base agent and strategy.
    pub fn into_parts(self) -> (A, S) {
        (self.agent, self.step_size)
    }
}

impl<A: LearningAgent, S: StepSize> LearningAgent for AdaptiveAgent<A, S> {
    type Transition = A::Transition;

    fn name(&self) -> String {
        format!("Adaptive ({}) {}", self.step_size.name(), self.agent.name())
    }

    fn alpha(&self) -> f64 {
        self.agent.alpha()
    }

    fn gamma(&self) -> f64 {
        self.agent.gamma()
    }

    fn weights(&self) -> ArrayViewD<'_, f64> {
        self.agent.weights()
    }

    fn traces(&self) -> ArrayViewD<'_, f64> {
        self.agent.traces()
    }

    /// Randomizes the base agent's parameters first, then the strategy's, which may depend on
    /// the agent's freshly picked learning rate.
    fn randomize_parameters(&mut self, params: &mut ParamSet, rng: &mut dyn RngCore) -> Vec<f64> {
        let mut values = self.agent.randomize_parameters(params, rng);
        let alpha = self.agent.alpha();
        values.extend(self.step_size.randomize_parameters(alpha, params, rng));
        values
    }

    fn descent(&mut self, transition: &Self::Transition) -> Result<Step> {
        self.agent.descent(transition)
    }

    fn rescale_update(&mut self, step: &Step) -> Result<ArrayD<f64>> {
        Ok(self.step_size.rescale(&self.agent.view(), step)?)
    }

    fn apply_update(&mut self, update: &ArrayD<f64>) -> Result<()> {
        self.agent.apply_update(update)
    }
}

/// Pairs `agent` with a fresh strategy of the given kind.
///
/// The result still needs to be initialized with `AdaptiveAgent::init`.
pub fn compose<A: LearningAgent>(
    kind: StepSizeKind,
    agent: A,
) -> AdaptiveAgent<A, Box<dyn StepSize>> {
    AdaptiveAgent::new(agent, kind.build())
}
