use log::{debug, trace};
use ndarray::ArrayD;
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

const MCCLAIN_A: &str = "mcclain_a";

/// Configuration of the `McClain` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McClainConfig {
    /// The step size the sequence converges to.
    pub a: f64,
}

impl Default for McClainConfig {
    fn default() -> Self {
        Self { a: 0.01 }
    }
}

impl McClainConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            a: params.get_or_insert(MCCLAIN_A, self.a),
        }
    }
}

/// McClain's formula for a scalar step size: `alpha_t = alpha_{t-1} / (1 + alpha_{t-1} - a)`.
///
/// The sequence decreases towards `a` only if it starts above it, so when the agent's learning
/// rate is smaller than `a` both values are swapped on initialization.
#[derive(Debug, Default)]
pub struct McClain {
    config: McClainConfig,
    state: Option<McClainState>,
}

#[derive(Debug)]
struct McClainState {
    shape: Vec<usize>,
    alpha: f64,
    a: f64,
}

impl McClain {
    pub const NAME: &'static str = "McClains";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `McClain` whose defaults come from `config`.
    pub fn with_config(config: McClainConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for McClain {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], mut alpha: f64, params: &mut ParamSet) -> Result<()> {
        let McClainConfig { mut a } = self.config.resolve(params);

        if alpha < a {
            debug!(alpha = alpha, a = a; "mcclain target above the initial step size, swapping them");
            std::mem::swap(&mut alpha, &mut a);
            params.insert(MCCLAIN_A, a);
        }

        self.state = Some(McClainState {
            shape: shape.to_vec(),
            alpha,
            a,
        });

        Ok(())
    }

    fn rescale(&mut self, _agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;

        let step_size = state.alpha;
        state.alpha /= 1. + state.alpha - state.a;

        trace!(step_size = step_size; "mcclain update");
        Ok(step.scaled(step_size))
    }

    fn randomize_parameters(
        &self,
        alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        vec![params.get_or_insert_with(MCCLAIN_A, || rng.random::<f64>() * alpha)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, step};

    fn factors(alpha: f64, a: f64, n: usize) -> Vec<f64> {
        let agent = Agent::new(1);
        let mut params: ParamSet = [(MCCLAIN_A, a)].into_iter().collect();
        let mut mcclain = McClain::new();
        mcclain.init(&[1], alpha, &mut params).unwrap();

        (0..n)
            .map(|_| mcclain.rescale(&agent.view(), &step(&[1.])).unwrap()[[0]])
            .collect()
    }

    #[test]
    fn decreases_towards_a() {
        let factors = factors(0.5, 0.01, 200);

        assert_eq!(factors[0], 0.5);
        assert!(factors.windows(2).all(|w| w[1] <= w[0]));
        assert!(factors.iter().all(|&f| f >= 0.01));
    }

    #[test]
    fn swaps_when_alpha_is_smaller() {
        let mut params: ParamSet = [(MCCLAIN_A, 0.3)].into_iter().collect();
        let mut mcclain = McClain::new();
        mcclain.init(&[1], 0.1, &mut params).unwrap();

        assert_eq!(params.get(MCCLAIN_A), Some(0.1));

        let agent = Agent::new(1);
        let first = mcclain.rescale(&agent.view(), &step(&[1.])).unwrap();
        assert_eq!(first[[0]], 0.3);
    }

    #[test]
    fn randomized_a_is_below_alpha() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let mut params = ParamSet::new();
            let values = McClain::new().randomize_parameters(0.2, &mut params, &mut rng);
            assert!((0. ..0.2).contains(&values[0]));
        }
    }
}
