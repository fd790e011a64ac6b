use ndarray::ArrayD;

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr};

/// A constant step size equal to the agent's learning rate.
#[derive(Debug, Default)]
pub struct Fixed {
    state: Option<FixedState>,
}

#[derive(Debug)]
struct FixedState {
    shape: Vec<usize>,
    alpha: f64,
}

impl Fixed {
    pub const NAME: &'static str = "Fixed StepSize";

    pub fn new() -> Self {
        Self::default()
    }
}

impl StepSize for Fixed {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, _params: &mut ParamSet) -> Result<()> {
        self.state = Some(FixedState {
            shape: shape.to_vec(),
            alpha,
        });

        Ok(())
    }

    fn rescale(&mut self, _agent: &AgentView<'_>, step: &Step) -> Result<ArrayD<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or(StepSizeErr::NotInitialized(Self::NAME))?;

        step.check_shape(&state.shape)?;
        Ok(step.scaled(state.alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, assert_close, step};

    #[test]
    fn multiplies_by_alpha() {
        let agent = Agent::new(3);
        let mut fixed = Fixed::new();
        fixed.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        for _ in 0..3 {
            let update = fixed.rescale(&agent.view(), &step(&[1., 2., 3.])).unwrap();
            assert_close(&update, &[0.1, 0.2, 0.3]);
        }
    }

    #[test]
    fn has_no_parameters() {
        let mut params = ParamSet::new();
        let mut rng = rand::rng();

        assert!(Fixed::new().randomize_parameters(0.1, &mut params, &mut rng).is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_uninitialized_use() {
        let agent = Agent::new(3);
        let err = Fixed::new().rescale(&agent.view(), &step(&[1., 2., 3.]));
        assert_eq!(err, Err(StepSizeErr::NotInitialized(Fixed::NAME)));
    }
}
