use ndarray::{ArrayD, IxDyn, Zip};
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

const RPROP_ETA_LOW: &str = "rprop_eta_low";
const RPROP_ETA_HIGH: &str = "rprop_eta_high";

/// Configuration of the `RProp` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RPropConfig {
    /// Step size used on components whose sign flipped.
    pub eta_low: f64,
    /// Step size used everywhere else.
    pub eta_high: f64,
}

impl Default for RPropConfig {
    fn default() -> Self {
        Self {
            eta_low: 0.01,
            eta_high: 1.2,
        }
    }
}

impl RPropConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            eta_low: params.get_or_insert(RPROP_ETA_LOW, self.eta_low),
            eta_high: params.get_or_insert(RPROP_ETA_HIGH, self.eta_high),
        }
    }
}

/// Resilient propagation, a per component step size.
///
/// Riedmiller, M. and Braun, H. (1993). A direct adaptive method for faster backpropagation
/// learning: The RPROP algorithm.
///
/// Every component whose previous update disagrees in sign with `delta * trace` (or is zero)
/// takes `eta_low`, the rest take `eta_high`. The previous update is never recorded and stays at
/// zero, so in practice every component takes `eta_low`.
#[derive(Debug, Default)]
pub struct RProp {
    config: RPropConfig,
    state: Option<RPropState>,
}

#[derive(Debug)]
struct RPropState {
    shape: Vec<usize>,
    last_update: ArrayD<f64>,
    eta_low: f64,
    eta_high: f64,
}

impl RProp {
    pub const NAME: &'static str = "RProp";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `RProp` whose defaults come from `config`.
    pub fn with_config(config: RPropConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for RProp {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], _alpha: f64, params: &mut ParamSet) -> Result<()> {
        let RPropConfig { eta_low, eta_high } = self.config.resolve(params);

        self.state = Some(RPropState {
            shape: shape.to_vec(),
            last_update: ArrayD::zeros(IxDyn(shape)),
            eta_low,
            eta_high,
        });

        Ok(())
    }

    fn rescale(&mut self, agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;
        agent.check_shape(&state.shape)?;

        let delta = step.delta;
        let mut update = ArrayD::from_elem(IxDyn(&state.shape), state.eta_high);

        Zip::from(&mut update)
            .and(&state.last_update)
            .and(&agent.traces)
            .and(&step.descent_direction)
            .for_each(|u, &last, &trace, &d| {
                if last * delta * trace <= 0. {
                    *u = state.eta_low;
                }
                *u *= d;
            });

        Ok(update)
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let eta_high = params.get_or_insert_with(RPROP_ETA_HIGH, || rng.random::<f64>() * 2.);
        let eta_low = params.get_or_insert_with(RPROP_ETA_LOW, || rng.random::<f64>() * eta_high);
        vec![eta_low, eta_high]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, assert_close, step};

    #[test]
    fn first_update_is_low() {
        let agent = Agent::new(3);
        let mut rprop = RProp::new();
        rprop.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        let update = rprop.rescale(&agent.view(), &step(&[1., 2., 3.])).unwrap();
        assert_close(&update, &[0.01, 0.02, 0.03]);
    }

    #[test]
    fn sign_agreement_selects_eta() {
        let mut agent = Agent::new(3);
        let mut rprop = RProp::new();
        rprop.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        rprop.state.as_mut().unwrap().last_update = crate::testing::array(&[0.5, -0.5, 0.]);

        // delta is 1, so the sign of last_update * trace decides
        let update = rprop.rescale(&agent.view(), &step(&[1., 1., 1.])).unwrap();
        assert_close(&update, &[1.2, 0.01, 0.01]);

        agent.traces = crate::testing::array(&[-1., -1., 1.]);
        let update = rprop.rescale(&agent.view(), &step(&[2., 2., 2.])).unwrap();
        assert_close(&update, &[0.02, 2.4, 0.02]);
    }

    #[test]
    fn last_update_is_not_tracked() {
        let mut agent = Agent::new(3);
        let mut rprop = RProp::new();
        rprop.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        for traces in [[1., 1., 1.], [-1., 1., -1.], [1., -1., 1.]] {
            agent.traces = crate::testing::array(&traces);
            let update = rprop.rescale(&agent.view(), &step(&[1., -1., 2.])).unwrap();
            assert_close(&update, &[0.01, -0.01, 0.02]);
        }
    }

    #[test]
    fn rejects_traces_of_another_shape() {
        let mut agent = Agent::new(3);
        agent.traces = crate::testing::array(&[1., 1.]);

        let mut rprop = RProp::new();
        rprop.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        let err = rprop.rescale(&agent.view(), &step(&[1., 2., 3.])).unwrap_err();
        assert!(matches!(err, StepSizeErr::ShapeMismatch { what: "traces", .. }));
    }

    #[test]
    fn randomized_low_never_exceeds_high() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let values = RProp::new().randomize_parameters(0.1, &mut ParamSet::new(), &mut rng);
            assert!(values[0] <= values[1]);
            assert!((0. ..2.).contains(&values[1]));
        }
    }
}
