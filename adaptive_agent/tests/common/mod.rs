#![allow(dead_code)]

use adaptive_agent::{AgentErr, LearningAgent, Result};
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use rand::{Rng, RngCore};
use step_sizes::{ParamSet, Step, linalg};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn array(values: &[f64]) -> ArrayD<f64> {
    ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap()
}

pub struct Transition {
    pub phi_t: ArrayD<f64>,
    pub phi_tp: ArrayD<f64>,
    pub reward: f64,
}

impl Transition {
    pub fn new(phi_t: &[f64], phi_tp: &[f64], reward: f64) -> Self {
        Self {
            phi_t: array(phi_t),
            phi_tp: array(phi_tp),
            reward,
        }
    }
}

/// Linear TD(lambda) with accumulating traces.
pub struct LinearTd {
    pub alpha: f64,
    pub gamma: f64,
    pub lambda: f64,
    pub weights: ArrayD<f64>,
    pub traces: ArrayD<f64>,
}

impl LinearTd {
    pub fn new(n: usize, alpha: f64, gamma: f64, lambda: f64) -> Self {
        Self {
            alpha,
            gamma,
            lambda,
            weights: ArrayD::zeros(IxDyn(&[n])),
            traces: ArrayD::zeros(IxDyn(&[n])),
        }
    }

    fn check_shape(&self, what: &'static str, got: &[usize]) -> Result<()> {
        if got != self.weights.shape() {
            return Err(AgentErr::ShapeMismatch {
                what,
                got: got.to_vec(),
                expected: self.weights.shape().to_vec(),
            });
        }

        Ok(())
    }
}

impl LearningAgent for LinearTd {
    type Transition = Transition;

    fn name(&self) -> String {
        "Linear TD(lambda)".to_string()
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn weights(&self) -> ArrayViewD<'_, f64> {
        self.weights.view()
    }

    fn traces(&self) -> ArrayViewD<'_, f64> {
        self.traces.view()
    }

    fn randomize_parameters(&mut self, params: &mut ParamSet, rng: &mut dyn RngCore) -> Vec<f64> {
        self.alpha = params.get_or_insert_with("alpha", || rng.random::<f64>());
        self.lambda = params.get_or_insert_with("lmbda", || rng.random::<f64>());
        vec![self.alpha, self.lambda]
    }

    fn descent(&mut self, transition: &Transition) -> Result<Step> {
        self.check_shape("phi_t", transition.phi_t.shape())?;
        self.check_shape("phi_tp", transition.phi_tp.shape())?;
        if !transition.reward.is_finite() {
            return Err(AgentErr::InvalidInput("reward must be finite"));
        }

        let delta = transition.reward
            + self.gamma * linalg::dot(self.weights.view(), transition.phi_tp.view())
            - linalg::dot(self.weights.view(), transition.phi_t.view());

        self.traces *= self.gamma * self.lambda;
        self.traces += &transition.phi_t;

        Ok(Step::new(
            transition.phi_t.clone(),
            transition.phi_tp.clone(),
            delta,
            transition.reward,
            self.traces.mapv(|e| delta * e),
        ))
    }

    fn apply_update(&mut self, update: &ArrayD<f64>) -> Result<()> {
        self.check_shape("update", update.shape())?;
        self.weights += update;
        Ok(())
    }
}
