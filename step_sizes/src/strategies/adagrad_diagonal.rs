use ndarray::{ArrayD, IxDyn, Zip};

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

/// Diagonal ADAGRAD.
///
/// John Duchi, Elad Hazan, Yoram Singer, 2010. Adaptive Subgradient Methods for Online Learning
/// and Stochastic Optimization.
#[derive(Debug, Default)]
pub struct AdagradDiagonal {
    state: Option<AdagradDiagonalState>,
}

#[derive(Debug)]
struct AdagradDiagonalState {
    shape: Vec<usize>,
    alpha: f64,
    step_sizes: ArrayD<f64>,
    h: ArrayD<f64>,
    counter: f64,
}

impl AdagradDiagonal {
    pub const NAME: &'static str = "AdagradDiagonal";

    pub fn new() -> Self {
        Self::default()
    }
}

impl StepSize for AdagradDiagonal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, _params: &mut ParamSet) -> Result<()> {
        self.state = Some(AdagradDiagonalState {
            shape: shape.to_vec(),
            alpha,
            step_sizes: ArrayD::from_elem(IxDyn(shape), alpha),
            h: ArrayD::zeros(IxDyn(shape)),
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

        state.counter += 1.;
        Zip::from(&mut state.h)
            .and(&step.descent_direction)
            .for_each(|h, &d| *h += d * d);

        // the first update always uses the base learning rate
        if state.counter > 1. {
            let alpha = state.alpha;
            let root = state.counter.sqrt();

            Zip::from(&mut state.step_sizes)
                .and(&state.h)
                .for_each(|s, &h| {
                    *s = alpha;
                    if h != 0. {
                        *s *= root / h.sqrt();
                    }
                });
        }

        Ok(&state.step_sizes * &step.descent_direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, assert_close, step};

    #[test]
    fn first_update_uses_alpha() {
        let agent = Agent::new(3);
        let mut adagrad = AdagradDiagonal::new();
        adagrad.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        let update = adagrad.rescale(&agent.view(), &step(&[5., -2., 0.])).unwrap();
        assert_close(&update, &[0.5, -0.2, 0.]);
    }

    #[test]
    fn repeated_gradients_shrink() {
        let agent = Agent::new(2);
        let mut adagrad = AdagradDiagonal::new();
        adagrad.init(&[2], 1., &mut ParamSet::new()).unwrap();

        adagrad.rescale(&agent.view(), &step(&[2., 0.])).unwrap();

        // after t updates of g = 2: h = 4t, step = sqrt(t) / sqrt(4t) = 1/2 on every update
        for _ in 0..5 {
            let update = adagrad.rescale(&agent.view(), &step(&[2., 0.])).unwrap();
            assert!((update[[0]] - 1.).abs() < 1e-12);
            assert_eq!(update[[1]], 0.);
        }

        // a larger gradient raises h faster than the counter
        let update = adagrad.rescale(&agent.view(), &step(&[20., 0.])).unwrap();
        assert!(update[[0]] / 20. < 0.5);
    }
}
