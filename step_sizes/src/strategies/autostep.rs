use log::debug;
use ndarray::{ArrayD, IxDyn, Zip};
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

const AUTOSTEP_MU: &str = "autostep_mu";
const AUTOSTEP_TAU: &str = "autostep_tau";

/// Configuration of the `Autostep` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutostepConfig {
    /// Meta step size.
    pub mu: f64,
    /// Time scale of the normalizer's decay.
    pub tau: f64,
}

impl Default for AutostepConfig {
    fn default() -> Self {
        Self { mu: 1e-2, tau: 1e4 }
    }
}

impl AutostepConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            mu: params.get_or_insert(AUTOSTEP_MU, self.mu),
            tau: params.get_or_insert(AUTOSTEP_TAU, self.tau),
        }
    }
}

/// Autostep, a tuning-free meta-descent of per component step sizes.
///
/// Mahmood, A. R., Sutton, R. S., Degris, T., and Pilarski, P. M. 2012. Tuning-free step-size
/// adaptation.
///
/// Not meant to be combined with eligibility traces.
#[derive(Debug, Default)]
pub struct Autostep {
    config: AutostepConfig,
    state: Option<AutostepState>,
}

#[derive(Debug)]
struct AutostepState {
    shape: Vec<usize>,
    step_sizes: ArrayD<f64>,
    h: ArrayD<f64>,
    v: ArrayD<f64>,
    mu: f64,
    tau: f64,
}

impl Autostep {
    pub const NAME: &'static str = "Autostep";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Autostep` whose defaults come from `config`.
    pub fn with_config(config: AutostepConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for Autostep {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let AutostepConfig { mu, tau } = self.config.resolve(params);
        debug!(mu = mu, tau = tau; "autostep initialized");

        self.state = Some(AutostepState {
            shape: shape.to_vec(),
            step_sizes: ArrayD::from_elem(IxDyn(shape), alpha),
            h: ArrayD::zeros(IxDyn(shape)),
            v: ArrayD::zeros(IxDyn(shape)),
            mu,
            tau,
        });

        Ok(())
    }

    fn rescale(&mut self, _agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;

        let AutostepState {
            step_sizes,
            h,
            v,
            mu,
            tau,
            ..
        } = state;

        let x = &step.phi_t;
        let delta = step.delta;
        let mut delta_term = x.mapv(|x| delta * x);
        delta_term *= &*h;

        // The normalizer tracks the magnitude of the meta gradient with the step sizes of the
        // previous update.
        Zip::from(&mut *v)
            .and(&delta_term)
            .and(&*step_sizes)
            .and(x)
            .for_each(|v, &dt, &alpha, &x| {
                let decayed = *v + (1. / *tau) * alpha * (x * x) * (dt.abs() - *v);
                *v = dt.abs().max(decayed);
            });

        Zip::from(&mut *step_sizes)
            .and(&delta_term)
            .and(&*v)
            .for_each(|alpha, &dt, &v| {
                if v != 0. {
                    *alpha *= (*mu * dt / v).exp();
                }
            });

        let m = Zip::from(&*step_sizes)
            .and(x)
            .fold(0f64, |acc, &alpha, &x| acc + alpha * (x * x))
            .max(1.);
        step_sizes.mapv_inplace(|alpha| alpha / m);

        Zip::from(&mut *h)
            .and(&*step_sizes)
            .and(x)
            .for_each(|h, &alpha, &x| {
                *h = *h * (1. - alpha * (x * x)) + alpha * delta * x;
            });

        Ok(&*step_sizes * &step.descent_direction)
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let mu = params.get_or_insert_with(AUTOSTEP_MU, || rng.random::<f64>());
        let tau = params.get_or_insert_with(AUTOSTEP_TAU, || rng.random::<f64>() * 1e6);
        vec![mu, tau]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, array};

    #[test]
    fn first_update_is_normalized_alpha() {
        // h starts at zero, so the first update only normalizes by max(alpha . x², 1).
        let agent = Agent::new(3);
        let mut autostep = Autostep::new();
        autostep.init(&[3], 0.5, &mut ParamSet::new()).unwrap();

        let phi = array(&[1., 1., 1.]);
        let step = Step::new(phi.clone(), phi, 1., 0., array(&[1., 1., 1.]));
        let update = autostep.rescale(&agent.view(), &step).unwrap();

        for u in update.iter() {
            assert!((u - 0.5 / 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn inactive_features_keep_their_step_size() {
        let agent = Agent::new(2);
        let mut autostep = Autostep::new();
        autostep.init(&[2], 0.1, &mut ParamSet::new()).unwrap();

        let phi = array(&[1., 0.]);
        for _ in 0..10 {
            let step = Step::new(phi.clone(), phi.clone(), 0.5, 0., array(&[1., 1.]));
            let update = autostep.rescale(&agent.view(), &step).unwrap();
            assert_eq!(update[[1]], 0.1);
        }
    }

    #[test]
    fn consistent_errors_grow_the_step_size() {
        let agent = Agent::new(1);
        let mut autostep = Autostep::new();
        autostep.init(&[1], 0.01, &mut ParamSet::new()).unwrap();

        let phi = array(&[1.]);
        let mut last = 0.;
        for i in 0..20 {
            let step = Step::new(phi.clone(), phi.clone(), 1., 0., array(&[1.]));
            let update = autostep.rescale(&agent.view(), &step).unwrap()[[0]];
            if i > 1 {
                assert!(update > last, "{update} <= {last}");
            }
            assert!(update <= 1.);
            last = update;
        }
    }
}
