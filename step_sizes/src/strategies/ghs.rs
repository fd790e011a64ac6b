use log::trace;
use ndarray::ArrayD;
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

const GHS_A: &str = "ghs_a";

/// Configuration of the `Ghs` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhsConfig {
    /// How slowly the step size decays, in amount of updates.
    pub a: f64,
}

impl Default for GhsConfig {
    fn default() -> Self {
        Self { a: 10. }
    }
}

impl GhsConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            a: params.get_or_insert(GHS_A, self.a),
        }
    }
}

/// Generalized Harmonic Stepsize, a scalar step size following
/// `alpha_t = alpha_0 * a / (a + t - 1)`.
#[derive(Debug, Default)]
pub struct Ghs {
    config: GhsConfig,
    state: Option<GhsState>,
}

#[derive(Debug)]
struct GhsState {
    shape: Vec<usize>,
    alpha: f64,
    a: f64,
    counter: u64,
}

impl Ghs {
    pub const NAME: &'static str = "GHS";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Ghs` whose defaults come from `config` instead of `GhsConfig::default`.
    pub fn with_config(config: GhsConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for Ghs {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let GhsConfig { a } = self.config.resolve(params);

        self.state = Some(GhsState {
            shape: shape.to_vec(),
            alpha,
            a,
            counter: 1,
        });

        Ok(())
    }

    fn rescale(&mut self, _agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;

        let step_size = state.alpha * state.a / (state.a + state.counter as f64 - 1.);
        state.counter += 1;

        trace!(step_size = step_size; "ghs update");
        Ok(step.scaled(step_size))
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        vec![params.get_or_insert_with(GHS_A, || rng.random::<f64>() * 10000.)]
    }
}
