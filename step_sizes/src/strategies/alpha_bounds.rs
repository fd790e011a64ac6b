use log::trace;
use ndarray::ArrayD;

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr, linalg};

/// Adaptive upper bound on a scalar step size for online TD learning.
///
/// Dabney, W. and A. G. Barto (2012). Adaptive Step-Size for Online Temporal Difference Learning.
///
/// Starts at 1 regardless of the agent's learning rate and only ever decreases, to
/// `1 / |e · (gamma * phi_tp - phi_t)|` whenever that bound is tighter.
#[derive(Debug, Default)]
pub struct AlphaBounds {
    state: Option<AlphaBoundsState>,
}

#[derive(Debug)]
struct AlphaBoundsState {
    shape: Vec<usize>,
    alpha: f64,
}

impl AlphaBounds {
    pub const NAME: &'static str = "AlphaBound";

    pub fn new() -> Self {
        Self::default()
    }
}

impl StepSize for AlphaBounds {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], _alpha: f64, _params: &mut ParamSet) -> Result<()> {
        self.state = Some(AlphaBoundsState {
            shape: shape.to_vec(),
            alpha: 1.,
        });

        Ok(())
    }

    fn rescale(&mut self, agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_mut()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;
        agent.check_shape(&state.shape)?;

        let td = step.td_features(agent.gamma);
        let denom = linalg::dot(agent.traces.view(), td.view());

        // a zero denominator gives an infinite bound, which `min` ignores
        state.alpha = state.alpha.min(1. / denom.abs());

        trace!(alpha = state.alpha; "alpha bound update");
        Ok(step.scaled(state.alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, array, assert_close, step};

    #[test]
    fn starts_at_one() {
        let mut agent = Agent::new(2);
        agent.traces = array(&[0., 0.]);

        let mut bounds = AlphaBounds::new();
        bounds.init(&[2], 0.1, &mut ParamSet::new()).unwrap();

        let update = bounds.rescale(&agent.view(), &step(&[2., 3.])).unwrap();
        assert_close(&update, &[2., 3.]);
    }

    #[test]
    fn never_increases() {
        let mut agent = Agent::new(2);
        let mut bounds = AlphaBounds::new();
        bounds.init(&[2], 0.1, &mut ParamSet::new()).unwrap();

        let traces = [[4., 0.], [0.5, 0.], [8., 1.], [0., 0.], [2., 2.]];
        let mut last = 1.;

        for e in traces {
            agent.traces = array(&e);
            let alpha = bounds.rescale(&agent.view(), &step(&[1., 1.])).unwrap()[[0]];
            assert!(alpha <= last);
            last = alpha;
        }

        // the tightest bound came from |[8, 1] . [-1, 0]| = 8
        assert_eq!(last, 1. / 8.);
    }
}
