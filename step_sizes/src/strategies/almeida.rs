use ndarray::{ArrayD, IxDyn, Zip};
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr, linalg};

const ALMEIDA_GAMMA: &str = "almeida_gamma";
const ALMEIDA_STEPSIZE: &str = "almeida_stepsize";

/// Configuration of the `Almeida` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlmeidaConfig {
    /// Decay of the squared gradient average.
    pub gamma: f64,
    /// Meta step size.
    pub stepsize: f64,
}

impl Default for AlmeidaConfig {
    fn default() -> Self {
        Self {
            gamma: 0.999,
            stepsize: 1e-5,
        }
    }
}

impl AlmeidaConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            gamma: params.get_or_insert(ALMEIDA_GAMMA, self.gamma),
            stepsize: params.get_or_insert(ALMEIDA_STEPSIZE, self.stepsize),
        }
    }
}

/// Per component step sizes adapted from the correlation of consecutive descent directions.
///
/// Luis B. Almeida, Thibault Langlois, Jose D. Amaral, and Alexander Plakhov. 1999. Parameter
/// adaptation in stochastic optimization.
#[derive(Debug, Default)]
pub struct Almeida {
    config: AlmeidaConfig,
    state: Option<AlmeidaState>,
}

#[derive(Debug)]
struct AlmeidaState {
    shape: Vec<usize>,
    step_sizes: ArrayD<f64>,
    v: ArrayD<f64>,
    prev_grad: Option<ArrayD<f64>>,
    gamma: f64,
    stepsize: f64,
}

impl Almeida {
    pub const NAME: &'static str = "Almeida";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Almeida` whose defaults come from `config`.
    pub fn with_config(config: AlmeidaConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for Almeida {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let AlmeidaConfig { gamma, stepsize } = self.config.resolve(params);

        self.state = Some(AlmeidaState {
            shape: shape.to_vec(),
            step_sizes: ArrayD::from_elem(IxDyn(shape), alpha),
            v: ArrayD::ones(IxDyn(shape)),
            prev_grad: None,
            gamma,
            stepsize,
        });

        Ok(())
    }

    fn rescale(&mut self, _agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;

        let d = &step.descent_direction;
        let AlmeidaState {
            step_sizes,
            v,
            prev_grad,
            gamma,
            stepsize,
            ..
        } = state;

        Zip::from(&mut *v)
            .and(d)
            .for_each(|v, &d| *v = *v * *gamma + (1. - *gamma) * (d * d));

        if let Some(prev) = prev_grad.replace(d.clone()) {
            let correlation = linalg::dot(prev.view(), d.view());

            Zip::from(&mut *step_sizes).and(&*v).for_each(|s, &v| {
                let v = if v == 0. { 1. } else { v };
                *s *= 1. + *stepsize * correlation / v;
            });
        }

        Ok(&*step_sizes * d)
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let gamma = params.get_or_insert_with(ALMEIDA_GAMMA, || rng.random::<f64>());
        let stepsize = params.get_or_insert_with(ALMEIDA_STEPSIZE, || rng.random::<f64>());
        vec![gamma, stepsize]
    }
}
