#![cfg(test)]

use ndarray::{ArrayD, IxDyn};

use crate::{AgentView, Step};

pub(crate) fn array(values: &[f64]) -> ArrayD<f64> {
    ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap()
}

/// Stand-in for the base agent state a strategy may read.
pub(crate) struct Agent {
    pub gamma: f64,
    pub weights: ArrayD<f64>,
    pub traces: ArrayD<f64>,
}

impl Agent {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            gamma: 0.9,
            weights: ArrayD::zeros(IxDyn(&[n])),
            traces: ArrayD::ones(IxDyn(&[n])),
        }
    }

    pub(crate) fn view(&self) -> AgentView<'_> {
        AgentView::new(self.gamma, self.weights.view(), self.traces.view())
    }
}

/// A step leaving the first feature active and moving to an all zero feature vector.
pub(crate) fn step(descent: &[f64]) -> Step {
    let n = descent.len();
    let mut phi_t = ArrayD::zeros(IxDyn(&[n]));
    phi_t[[0]] = 1.;

    Step::new(phi_t, ArrayD::zeros(IxDyn(&[n])), 1., 0., array(descent))
}

pub(crate) fn assert_close(got: &ArrayD<f64>, expected: &[f64]) {
    assert_eq!(got.len(), expected.len(), "got {got}");
    for (g, e) in got.iter().zip(expected) {
        assert!((g - e).abs() < 1e-12, "got {got}, expected {expected:?}");
    }
}
