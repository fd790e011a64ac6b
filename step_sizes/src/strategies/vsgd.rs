use log::debug;
use ndarray::{ArrayD, IxDyn, Zip};
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

const VSGD_INITMETA: &str = "vsgd_initmeta";
const VSGD_SLOWSTART: &str = "vsgd_slowstart";

/// Configuration of the `VSgd` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VSgdConfig {
    /// Initial memory size of the moving averages.
    pub initmeta: f64,
    /// Amount of updates before the memory size starts adapting.
    pub slowstart: i64,
}

impl Default for VSgdConfig {
    fn default() -> Self {
        Self {
            initmeta: 100.,
            slowstart: 50,
        }
    }
}

impl VSgdConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            initmeta: params.get_or_insert(VSGD_INITMETA, self.initmeta),
            slowstart: params.get_or_insert(VSGD_SLOWSTART, self.slowstart as f64) as i64,
        }
    }
}

/// vSGD, per component step sizes for noisy quadratic objectives.
///
/// Tom Schaul, Sixin Zhang, and Yann LeCun, 2013. No More Pesky Learning Rates.
///
/// The curvature is approximated with `(gamma * phi_tp - phi_t)²`.
#[derive(Debug, Default)]
pub struct VSgd {
    config: VSgdConfig,
    state: Option<VSgdState>,
}

#[derive(Debug)]
struct VSgdState {
    shape: Vec<usize>,
    step_sizes: ArrayD<f64>,
    g: ArrayD<f64>,
    v: ArrayD<f64>,
    h: ArrayD<f64>,
    t: ArrayD<f64>,
    slow_start: i64,
}

impl VSgd {
    pub const NAME: &'static str = "vSGD";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `VSgd` whose defaults come from `config`.
    pub fn with_config(config: VSgdConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for VSgd {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let VSgdConfig {
            initmeta,
            slowstart,
        } = self.config.resolve(params);

        self.state = Some(VSgdState {
            shape: shape.to_vec(),
            step_sizes: ArrayD::from_elem(IxDyn(shape), alpha),
            g: ArrayD::zeros(IxDyn(shape)),
            v: ArrayD::zeros(IxDyn(shape)),
            h: ArrayD::zeros(IxDyn(shape)),
            t: ArrayD::from_elem(IxDyn(shape), initmeta),
            slow_start: slowstart,
        });

        Ok(())
    }

    fn rescale(&mut self, agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;

        let hessian = step.td_features(agent.gamma).mapv(|x| x * x);
        let VSgdState {
            step_sizes,
            g,
            v,
            h,
            t,
            slow_start,
            ..
        } = state;

        Zip::from(&mut *g)
            .and(&mut *v)
            .and(&mut *h)
            .and(&*t)
            .and(&step.descent_direction)
            .and(&hessian)
            .for_each(|g, v, h, &t, &d, &hessian| {
                let keep = -(1. / t - 1.);
                let rate = 1. / t;

                *g = *g * keep + rate * d;
                *v = *v * keep + rate * (d * d);
                *h = *h * keep + rate * hessian;
            });

        Zip::from(&mut *step_sizes)
            .and(&*g)
            .and(&*v)
            .and(&*h)
            .for_each(|s, &g, &v, &h| {
                let denom = h * v;
                let denom = if denom == 0. { 1. } else { denom };
                *s = ((g * g) / denom).min(1.);
            });

        if *slow_start <= 0 {
            Zip::from(&mut *t).and(&*g).and(&*v).for_each(|t, &g, &v| {
                // v is only zero when every direction so far was zero, and so is g
                let v = if v == 0. { 1. } else { v };
                *t *= (-((g * g) / v - 1.)).clamp(1e-15, 1.);
                *t += 1.;
            });
        } else if *slow_start == 1 {
            debug!("vsgd slow start over, memory sizes start adapting");
        }
        *slow_start = slow_start.saturating_sub(1);

        Ok(&*step_sizes * &step.descent_direction)
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let slowstart =
            params.get_or_insert_with(VSGD_SLOWSTART, || rng.random_range(0..500u32) as f64);
        let initmeta =
            params.get_or_insert_with(VSGD_INITMETA, || rng.random_range(10..1010u32) as f64);
        vec![slowstart, initmeta]
    }
}
