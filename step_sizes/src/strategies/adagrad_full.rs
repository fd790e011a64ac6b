use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::ArrayD;

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr, linalg};

const ADAGRAD_PRECOND: &str = "adagrad_precond";

/// Configuration of the `AdagradFull` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdagradFullConfig {
    /// Scale of the identity the inverse preconditioner starts from.
    pub precond: f64,
}

impl Default for AdagradFullConfig {
    fn default() -> Self {
        Self { precond: 0.001 }
    }
}

impl AdagradFullConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            precond: params.get_or_insert(ADAGRAD_PRECOND, self.precond),
        }
    }
}

/// Full matrix ADAGRAD.
///
/// John Duchi, Elad Hazan, Yoram Singer, 2010. Adaptive Subgradient Methods for Online Learning
/// and Stochastic Optimization.
///
/// Keeps the inverse of the accumulated outer products of the descent directions, updated with
/// Sherman-Morrison, and preconditions every direction with its square root. Memory is quadratic
/// and every update cubic in the amount of weights, so this is only usable on small agents.
#[derive(Debug, Default)]
pub struct AdagradFull {
    config: AdagradFullConfig,
    state: Option<AdagradFullState>,
}

#[derive(Debug)]
struct AdagradFullState {
    shape: Vec<usize>,
    alpha: f64,
    h: DMatrix<f64>,
    counter: f64,
}

impl AdagradFull {
    pub const NAME: &'static str = "AdagradFull";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `AdagradFull` whose defaults come from `config`.
    pub fn with_config(config: AdagradFullConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl StepSize for AdagradFull {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let AdagradFullConfig { precond } = self.config.resolve(params);
        let size: usize = shape.iter().product();
        debug!(size = size, precond = precond; "allocating full adagrad preconditioner");

        self.state = Some(AdagradFullState {
            shape: shape.to_vec(),
            alpha,
            h: DMatrix::identity(size, size) * precond,
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

        let d = &step.descent_direction;
        let g = DVector::from_iterator(d.len(), d.iter().copied());
        state.h = linalg::sherman_morrison(&state.h, &g, &g, 1.);

        let mut preconditioned = linalg::sqrtm_symmetric(&state.h) * &g;
        preconditioned *= state.counter.sqrt();

        let mut update = d.clone();
        update
            .iter_mut()
            .zip(preconditioned.iter())
            .for_each(|(u, &p)| *u = state.alpha * p);

        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Agent, assert_close, step};

    #[test]
    fn single_component_closed_form() {
        // With a single weight h is the scalar 1 / (1/p + sum g²).
        let agent = Agent::new(1);
        let mut adagrad = AdagradFull::new();
        adagrad.init(&[1], 0.5, &mut ParamSet::new()).unwrap();

        let mut sum: f64 = 1. / 0.001;
        for (t, g) in [2., -1., 3.].into_iter().enumerate() {
            sum += g * g;
            let expected = 0.5 * (1. / sum).sqrt() * g * ((t + 1) as f64).sqrt();

            let update = adagrad.rescale(&agent.view(), &step(&[g])).unwrap();
            assert!((update[[0]] - expected).abs() < 1e-9, "{update} != {expected}");
        }
    }

    #[test]
    fn keeps_matrix_shapes() {
        let agent = Agent::new(4);
        let mut adagrad = AdagradFull::new();
        let mut params = ParamSet::new();
        adagrad.init(&[2, 2], 0.1, &mut params).unwrap();
        assert_eq!(params.get(ADAGRAD_PRECOND), Some(0.001));

        let phi = ArrayD::zeros(ndarray::IxDyn(&[2, 2]));
        let d = ArrayD::from_shape_vec(ndarray::IxDyn(&[2, 2]), vec![1., 0., 0., 1.]).unwrap();
        let step = Step::new(phi.clone(), phi, 0., 0., d);

        let update = adagrad.rescale(&agent.view(), &step).unwrap();
        assert_eq!(update.shape(), &[2, 2]);
        assert!(update.iter().all(|u| u.is_finite()));
    }

    #[test]
    fn zero_direction_is_a_noop() {
        let agent = Agent::new(3);
        let mut adagrad = AdagradFull::new();
        adagrad.init(&[3], 0.1, &mut ParamSet::new()).unwrap();

        let update = adagrad.rescale(&agent.view(), &step(&[0., 0., 0.])).unwrap();
        assert_close(&update, &[0., 0., 0.]);
    }
}
