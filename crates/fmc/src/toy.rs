//! Toy models for tests, doc examples, and smoke-testing a search setup.
//!
//! [`LinearDynamics`] treats the embedding space literally: an action is a
//! single scalar added to every coordinate of a walker's state, and the
//! reward is the action itself. [`SumValue`] scores a state by the sum of
//! its coordinates. Together they make every quantity in a search
//! hand-computable.

use fractal_core::{DynamicsModel, Prediction, PredictionModel, RepresentationModel};
use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut2, Axis};
use rand::Rng;
use std::cell::Cell;

/// Additive scalar-action dynamics: `state += action`, `reward = action`.
///
/// Action sampling is uniform on [-1, 1) by default, or follows a scripted
/// sequence (cycled) when one is supplied, which pins down every random
/// choice a test cares about except partner assignment and the clone
/// threshold.
pub struct LinearDynamics {
    state: Array2<f32>,
    embedding_size: usize,
    script: Vec<f32>,
    cursor: Cell<usize>,
}

impl LinearDynamics {
    pub fn new(embedding_size: usize) -> Self {
        Self {
            state: Array2::zeros((0, embedding_size)),
            embedding_size,
            script: Vec::new(),
            cursor: Cell::new(0),
        }
    }

    /// Sample actions from `script` in order (cycling) instead of the RNG.
    pub fn with_script(embedding_size: usize, script: Vec<f32>) -> Self {
        assert!(!script.is_empty(), "action script must be non-empty");
        Self {
            script,
            ..Self::new(embedding_size)
        }
    }
}

impl DynamicsModel for LinearDynamics {
    type Action = f32;

    fn embedding_size(&self) -> usize {
        self.embedding_size
    }

    fn set_state(&mut self, state: Array2<f32>) {
        assert_eq!(state.ncols(), self.embedding_size);
        self.state = state;
        self.cursor.set(0);
    }

    fn state(&self) -> ArrayView2<'_, f32> {
        self.state.view()
    }

    fn state_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.state.view_mut()
    }

    fn sample_action<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.script.is_empty() {
            rng.gen_range(-1.0..1.0)
        } else {
            let index = self.cursor.get();
            self.cursor.set(index + 1);
            self.script[index % self.script.len()]
        }
    }

    fn advance(&mut self, actions: &[f32]) -> Array1<f32> {
        assert_eq!(actions.len(), self.state.nrows());
        for (mut row, &action) in self.state.rows_mut().into_iter().zip(actions) {
            row += action;
        }
        Array1::from(actions.to_vec())
    }
}

/// Value model scoring each walker by the sum of its state coordinates.
/// No policy head.
pub struct SumValue;

impl PredictionModel for SumValue {
    fn evaluate(&self, state: ArrayView2<'_, f32>) -> Prediction {
        Prediction {
            policy: None,
            values: state.sum_axis(Axis(1)),
        }
    }
}

/// Representation model that passes the observation through unchanged.
pub struct IdentityRepresentation;

impl RepresentationModel for IdentityRepresentation {
    type Observation = Vec<f32>;

    fn represent(&self, observation: &Vec<f32>) -> Array1<f32> {
        Array1::from(observation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_advance_adds_action_and_returns_it_as_reward() {
        let mut dynamics = LinearDynamics::new(2);
        dynamics.set_state(array![[0.0, 0.0], [1.0, 1.0]]);

        let rewards = dynamics.advance(&[2.0, -1.0]);

        assert_eq!(rewards, array![2.0, -1.0]);
        assert_eq!(dynamics.state.row(0), array![2.0, 2.0]);
        assert_eq!(dynamics.state.row(1), array![0.0, 0.0]);
    }

    #[test]
    fn test_scripted_sampling_cycles() {
        let dynamics = LinearDynamics::with_script(2, vec![0.5, 1.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let drawn: Vec<f32> = (0..3).map(|_| dynamics.sample_action(&mut rng)).collect();
        assert_eq!(drawn, vec![0.5, 1.5, 0.5]);
    }

    #[test]
    fn test_sum_value_scores_row_sums() {
        let state = array![[1.0, 2.0], [3.0, -1.0]];
        let prediction = SumValue.evaluate(state.view());
        assert_eq!(prediction.values, array![3.0, 2.0]);
        assert!(prediction.policy.is_none());
    }
}
