use log::debug;
use ndarray::{ArrayD, IxDyn, Zip};
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use crate::{AgentView, ParamSet, Result, Step, StepSize, StepSizeErr, linalg};

const LECUN_GAMMA: &str = "lecun_gamma";
const LECUN_ALPHA: &str = "lecun_alpha";
const LECUN_THRESHOLD: &str = "lecun_threshold";

/// Configuration of the `InvMaxEigen` step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvMaxEigenConfig {
    /// Convergence rate of the eigenvector estimate, trading speed for accuracy.
    pub gamma: f64,
    /// Size of the weight perturbation. Small values give better estimates but may be unstable.
    pub alpha: f64,
    /// Relative change of the estimate's norm under which it is considered converged.
    pub threshold: f64,
}

impl Default for InvMaxEigenConfig {
    fn default() -> Self {
        Self {
            gamma: 0.01,
            alpha: 0.01,
            threshold: 0.001,
        }
    }
}

impl InvMaxEigenConfig {
    /// Reads the configuration from `params`, using `self` for the missing keys and writing the
    /// resolved values back.
    pub fn resolve(self, params: &mut ParamSet) -> Self {
        Self {
            gamma: params.get_or_insert(LECUN_GAMMA, self.gamma),
            alpha: params.get_or_insert(LECUN_ALPHA, self.alpha),
            threshold: params.get_or_insert(LECUN_THRESHOLD, self.threshold),
        }
    }
}

/// Scalar step size set to the inverse of the Hessian's largest eigenvalue.
///
/// Yann LeCun, Patrice Simard, and Barak Pearlmutter. 1993. Automatic learning rate maximization
/// by on-line estimation of the Hessian's eigenvectors.
///
/// The principal eigenvector is estimated with a power method where Hessian-vector products are
/// replaced by finite differences between the gradient at the weights and at the weights
/// perturbed along the current estimate. Once the estimate's norm stops changing, the step size
/// becomes one over that norm and the estimation starts over from a random direction.
#[derive(Debug)]
pub struct InvMaxEigen {
    config: InvMaxEigenConfig,
    rng: StdRng,
    state: Option<InvMaxEigenState>,
}

#[derive(Debug)]
struct InvMaxEigenState {
    shape: Vec<usize>,
    step_size: f64,
    eigenvector: ArrayD<f64>,
    config: InvMaxEigenConfig,
}

impl InvMaxEigen {
    pub const NAME: &'static str = "InvMaxEigen";

    /// Creates a new `InvMaxEigen` seeded from the thread local generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Creates a new `InvMaxEigen` whose random restarts are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            config: InvMaxEigenConfig::default(),
            rng,
            state: None,
        }
    }

    /// Replaces the defaults used for the parameters missing at initialization.
    pub fn config(mut self, config: InvMaxEigenConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for InvMaxEigen {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples a direction uniformly on the unit sphere.
fn random_unit(shape: &[usize], rng: &mut StdRng) -> ArrayD<f64> {
    let mut direction: ArrayD<f64> =
        ArrayD::from_shape_simple_fn(IxDyn(shape), || rng.sample(StandardNormal));
    let norm = linalg::norm(direction.view());
    if norm > 0. {
        direction /= norm;
    }

    direction
}

impl StepSize for InvMaxEigen {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, shape: &[usize], alpha: f64, params: &mut ParamSet) -> Result<()> {
        let config = self.config.resolve(params);

        self.state = Some(InvMaxEigenState {
            shape: shape.to_vec(),
            step_size: alpha,
            eigenvector: random_unit(shape, &mut self.rng),
            config,
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

        let InvMaxEigenConfig {
            gamma,
            alpha,
            threshold,
        } = state.config;

        let prev_norm = linalg::norm(state.eigenvector.view());
        if !(prev_norm > 0.) {
            state.eigenvector = random_unit(&state.shape, &mut self.rng);
            return Ok(step.scaled(state.step_size));
        }

        // TD error with the weights perturbed along the estimate
        let td = step.td_features(agent.gamma);
        let mut perturbed = state.eigenvector.mapv(|e| alpha * (e / prev_norm));
        perturbed += &agent.weights;
        let perturbed_delta = linalg::dot(perturbed.view(), td.view()) + step.reward;

        // The descent direction is the negative gradient, and so is `perturbed_delta * td`.
        Zip::from(&mut state.eigenvector)
            .and(&td)
            .and(&step.descent_direction)
            .for_each(|e, &td, &d| {
                *e *= 1. - gamma;
                *e += (gamma / alpha) * (perturbed_delta * td + d);
            });

        let norm = linalg::norm(state.eigenvector.view());
        let change = (prev_norm - norm).abs() / prev_norm;

        if change <= threshold {
            if norm > 0. && norm.is_finite() {
                state.step_size = 1. / norm;
                debug!(eigenvalue = norm, step_size = state.step_size; "eigenvector estimate converged");
            }

            state.eigenvector = random_unit(&state.shape, &mut self.rng);
        }

        Ok(step.scaled(state.step_size))
    }

    fn randomize_parameters(
        &self,
        _alpha: f64,
        params: &mut ParamSet,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let gamma = params.get_or_insert_with(LECUN_GAMMA, || rng.random::<f64>());
        let alpha = params.get_or_insert_with(LECUN_ALPHA, || rng.random::<f64>());
        let threshold = params.get_or_insert_with(LECUN_THRESHOLD, || rng.random::<f64>() * 0.1);
        vec![gamma, alpha, threshold]
    }
}
