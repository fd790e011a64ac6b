use log::trace;
use ndarray::ArrayD;
use rand::{Rng, RngCore};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

const STC_C: &str = "stc_c";
const STC_N: &str = "stc_N";

/// Configuration of the `Stc` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StcConfig {
    /// The target step size.
    pub c: f64,
    /// Pivot point, roughly the amount of updates after which the schedule starts converging
    /// rather than searching.
    pub n: f64,
}

impl Default for StcConfig {
    fn default() -> Self {
        Self { c: 1e6, n: 5e5 }
    }
}

impl StcConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            c: params.get_or_insert(STC_C, self.c),
            n: params.get_or_insert(STC_N, self.n),
        }
    }
}

/// Search-Then-Converge scalar step size.
///
/// `alpha_t = alpha_{t-1} * (1 + (c/a0)(t/N)) / (1 + (c/a0)(t/N) + N t²/N²)`, where `a0` is the
/// agent's initial learning rate.
#[derive(Debug, Default)]
pub struct Stc {
    config: StcConfig,
    state: Option<StcState>,
}

#[derive(Debug)]
struct StcState {
    shape: Vec<usize>,
    alpha: f64,
    a0: f64,
    c: f64,
    n: f64,
    counter: f64,
}

impl Stc {
    pub const NAME: &'static str = "STC";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Stc` whose defaults come from `config`.
    pub fn with_config(config: StcConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for Stc {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let StcConfig { c, n } = self.config.resolve(params);

        self.state = Some(StcState {
            shape: shape.to_vec(),
            alpha,
            a0: alpha,
            c,
            n,
            counter: 0.,
        });

        Ok(())
    }

    fn rescale(&mut self, _agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;

        let StcState {
            a0, c, n, counter, ..
        } = *state;

        let search = (c * counter) / (a0 * n);
        state.alpha *= 1. + search;
        state.alpha /= 1. + search + n * (counter * counter) / (n * n);
        state.counter += 1.;

        trace!(step_size = state.alpha; "stc update");
        Ok(step.scaled(state.alpha))
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let c = params.get_or_insert_with(STC_C, || rng.random::<f64>() * 1e10);
        let n = params.get_or_insert_with(STC_N, || rng.random::<f64>() * 1e6);
        vec![c, n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, step};

    #[test]
    fn first_update_uses_alpha() {
        let agent = Agent::new(2);
        let mut stc = Stc::new();
        stc.init(&[2], 0.5, &mut ParamSet::new()).unwrap();

        let update = stc.rescale(&agent.view(), &step(&[1., -2.])).unwrap();
        assert_eq!(update.as_slice().unwrap(), &[0.5, -1.]);
    }

    #[test]
    fn follows_the_schedule() {
        let agent = Agent::new(1);
        let mut params: ParamSet = [(STC_C, 2.), (STC_N, 4.)].into_iter().collect();
        let mut stc = Stc::new();
        stc.init(&[1], 1., &mut params).unwrap();

        let mut alpha: f64 = 1.;
        for t in 0..20 {
            let t = t as f64;
            let search = (2. * t) / (1. * 4.);
            alpha *= 1. + search;
            alpha /= 1. + search + 4. * (t * t) / 16.;

            let got = stc.rescale(&agent.view(), &step(&[1.])).unwrap()[[0]];
            assert_eq!(got, alpha);
        }
    }

    #[test]
    fn randomization_order_and_ranges() {
        let mut rng = rand::rng();
        let mut params: ParamSet = [(STC_N, 7.)].into_iter().collect();
        let values = Stc::new().randomize_parameters(0.1, &mut params, &mut rng);

        assert_eq!(values.len(), 2);
        assert!((0. ..1e10).contains(&values[0]));
        assert_eq!(values[1], 7.);
    }
}
