use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut2};
use rand::Rng;

/// Output of a prediction model forward pass over a walker batch.
///
/// The search only consumes `values`; the policy head is carried for
/// callers that want it (e.g. future policy-guided action sampling) and
/// may be omitted by models that do not have one.
pub struct Prediction {
    /// Optional policy logits/probabilities, one row per walker.
    pub policy: Option<Array2<f32>>,

    /// Value estimate per walker.
    pub values: Array1<f32>,
}

/// A learned transition model over a batched hidden state.
///
/// The model owns the hidden state buffer of shape
/// `(num_walkers, embedding_size)`. During a search the controller is the
/// sole writer of that buffer: it seeds it via [`set_state`], advances it
/// through [`advance`], and overwrites rows during cloning through
/// [`state_mut`]. Nothing else may mutate the buffer while a search is in
/// flight.
///
/// [`set_state`]: DynamicsModel::set_state
/// [`advance`]: DynamicsModel::advance
/// [`state_mut`]: DynamicsModel::state_mut
pub trait DynamicsModel {
    /// The action format the model advances on (e.g. a discrete index or a
    /// continuous control vector).
    type Action: Clone;

    /// Dimensionality of a single hidden-state embedding.
    fn embedding_size(&self) -> usize;

    /// Replace the batched hidden state. The array must have
    /// `embedding_size` columns; the row count sets the walker count.
    fn set_state(&mut self, state: Array2<f32>);

    /// Read-only view of the batched hidden state.
    fn state(&self) -> ArrayView2<'_, f32>;

    /// Mutable view of the batched hidden state, handed to the search
    /// controller for clone execution.
    fn state_mut(&mut self) -> ArrayViewMut2<'_, f32>;

    /// Sample one action from the model's action space.
    ///
    /// Called once per walker per iteration; draws must come from the
    /// supplied RNG so a search is reproducible from a seed.
    fn sample_action<R: Rng>(&self, rng: &mut R) -> Self::Action;

    /// Advance every walker one step, one action per row, returning the
    /// per-walker reward. Mutates the hidden state in place.
    fn advance(&mut self, actions: &[Self::Action]) -> Array1<f32>;
}

/// A learned value (and optional policy) head over a batched hidden state.
pub trait PredictionModel {
    /// Evaluate every walker's state in one batched call.
    fn evaluate(&self, state: ArrayView2<'_, f32>) -> Prediction;
}

/// Maps a raw observation to the embedding the search plans from.
///
/// Consumed outside the search loop, once per planning call.
pub trait RepresentationModel {
    /// The raw observation format (e.g. pixels, a feature vector).
    type Observation;

    /// Encode an observation as a single root embedding.
    fn represent(&self, observation: &Self::Observation) -> Array1<f32>;
}
