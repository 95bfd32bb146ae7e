//! Fractal Monte Carlo search implementation.
//!
//! Runs the walker population through k iterations of
//! perturbation -> clone preparation -> backup -> clone execution, then
//! selects the root action of the walker with the highest average
//! backed-up value. All phases operate on the whole population at once;
//! iteration i+1 strictly depends on the post-clone state of iteration i.

use crate::{
    cloning,
    config::{BackupPolicy, FmcConfig},
    observer::{BackupStats, CloneEvent, NoopObserver, PerturbationStats, SearchObserver},
    walkers::WalkerBatch,
};
use fractal_core::{DynamicsModel, FractalError, PredictionModel, Result};
use ndarray::{Array1, Array2, ArrayView1, Zip};
use rand::Rng;

/// Result of an FMC search.
#[derive(Clone, Debug)]
pub struct SearchResult<A: Clone> {
    /// Root action of the walker with the highest average backed-up value.
    /// Ties break toward the lowest walker index.
    pub best_action: A,

    /// Aggregate root value estimate: total backed-up value over total
    /// visits across the whole population. The FMC analogue of an MCTS
    /// root value.
    pub root_value: f32,
}

/// Fractal Monte Carlo search.
///
/// Generic over:
/// - `D`: The dynamics model (owns the batched hidden state)
/// - `P`: The prediction/value model
/// - `R`: The random number generator
/// - `O`: The search observer (defaults to [`NoopObserver`])
pub struct Fmc<D: DynamicsModel, P: PredictionModel, R: Rng, O: SearchObserver = NoopObserver> {
    config: FmcConfig,
    dynamics: D,
    prediction: P,
    rng: R,
    observer: O,

    batch: WalkerBatch<D::Action>,
    predicted_values: Array1<f32>,
    root_value_sum: f32,
    root_visits: u32,
}

impl<D, P, R> Fmc<D, P, R, NoopObserver>
where
    D: DynamicsModel,
    P: PredictionModel,
    R: Rng,
{
    /// Create a new FMC instance with no observer.
    pub fn new(config: FmcConfig, dynamics: D, prediction: P, rng: R) -> Self {
        Self::with_observer(config, dynamics, prediction, rng, NoopObserver)
    }
}

impl<D, P, R, O> Fmc<D, P, R, O>
where
    D: DynamicsModel,
    P: PredictionModel,
    R: Rng,
    O: SearchObserver,
{
    /// Create a new FMC instance reporting to `observer`.
    pub fn with_observer(config: FmcConfig, dynamics: D, prediction: P, rng: R, observer: O) -> Self {
        let num_walkers = config.num_walkers;
        Self {
            config,
            dynamics,
            prediction,
            rng,
            observer,
            batch: WalkerBatch::new(num_walkers, 0),
            predicted_values: Array1::zeros(num_walkers),
            root_value_sum: 0.0,
            root_visits: 0,
        }
    }

    /// Run FMC for `k` iterations from `root_state`, returning the best
    /// root action and the aggregate root value estimate.
    ///
    /// The walker bookkeeping is reset and the dynamics model's hidden
    /// state is reseeded by broadcasting `root_state` to every walker; the
    /// search is then the sole writer of that state until this call
    /// returns.
    ///
    /// # Errors
    /// Rejected before any state mutation:
    /// - `InvalidLookahead` if `k == 0`
    /// - `EmptyPopulation` if the config names zero walkers
    /// - `EmbeddingMismatch` if `root_state` does not match the dynamics
    ///   model's embedding size
    pub fn simulate(&mut self, root_state: ArrayView1<'_, f32>, k: usize) -> Result<SearchResult<D::Action>> {
        if k == 0 {
            return Err(FractalError::InvalidLookahead(k));
        }
        let num_walkers = self.config.num_walkers;
        if num_walkers == 0 {
            return Err(FractalError::EmptyPopulation);
        }
        let embedding_size = self.dynamics.embedding_size();
        if root_state.len() != embedding_size {
            return Err(FractalError::EmbeddingMismatch {
                expected: embedding_size,
                actual: root_state.len(),
            });
        }

        self.set_state(root_state);
        self.batch = WalkerBatch::new(num_walkers, k);
        self.predicted_values = Array1::zeros(num_walkers);
        self.root_value_sum = 0.0;
        self.root_visits = 0;

        for iteration in 0..k {
            self.perturbate(iteration);

            let partners = self.assign_clone_partners();
            // One shared threshold per iteration; see `cloning::clone_mask`.
            let threshold: f32 = self.rng.gen();
            self.run_cloning(iteration, k, &partners, threshold);
        }

        debug_assert_eq!(self.dynamics.state().dim(), (num_walkers, embedding_size));

        let result = self.select_root_action();
        self.observer.on_complete(result.root_value);
        Ok(result)
    }

    /// Broadcast a single root embedding to every walker's state row.
    fn set_state(&mut self, root_state: ArrayView1<'_, f32>) {
        let mut batched = Array2::zeros((self.config.num_walkers, root_state.len()));
        for mut row in batched.rows_mut() {
            row.assign(&root_state);
        }
        self.dynamics.set_state(batched);
    }

    /// Advance the state of each walker and score the result.
    fn perturbate(&mut self, iteration: usize) {
        // Per-walker independent action draws from the single search RNG.
        let actions: Vec<D::Action> = (0..self.config.num_walkers)
            .map(|_| self.dynamics.sample_action(&mut self.rng))
            .collect();

        let rewards = self.dynamics.advance(&actions);
        let prediction = self.prediction.evaluate(self.dynamics.state());

        if iteration == 0 {
            // Snapshot, not alias: cloning is the only thing allowed to
            // rewrite a root action after this point.
            self.batch.root_actions = actions.clone();
        }
        self.batch.actions = actions;

        self.observer.on_perturbation(&PerturbationStats {
            iteration,
            mean_reward: mean(&rewards),
            mean_predicted_value: mean(&prediction.values),
        });

        self.batch.reward_buffer.column_mut(iteration).assign(&rewards);
        self.predicted_values = prediction.values;
    }

    /// Uniform partner draw with replacement; self-partnering and
    /// asymmetric pairs are allowed.
    fn assign_clone_partners(&mut self) -> Array1<usize> {
        let num_walkers = self.config.num_walkers;
        Array1::from_shape_fn(num_walkers, |_| self.rng.gen_range(0..num_walkers))
    }

    /// Clone preparation, backup, and clone execution for one iteration.
    fn run_cloning(&mut self, iteration: usize, k: usize, partners: &Array1<usize>, threshold: f32) {
        let distances = cloning::pairwise_distances(&self.dynamics.state(), partners);
        let virtual_rewards =
            cloning::virtual_rewards(&self.predicted_values, &distances, self.config.balance);
        let probabilities = cloning::clone_probabilities(&virtual_rewards, partners);
        let mask = cloning::clone_mask(&probabilities, threshold);

        let num_cloned = mask.iter().filter(|&&cloned| cloned).count();
        self.observer.on_cloning(&CloneEvent {
            iteration,
            partners,
            mask: &mask,
            mean_virtual_reward: mean(&virtual_rewards),
            mean_distance: mean(&distances),
            num_cloned,
        });

        // Backup must see the pre-clone accumulators; cloning then moves
        // the finalized credit along with everything else.
        self.backup(iteration, k, &mask);
        self.batch
            .execute_clone(self.dynamics.state_mut(), partners, &mask);
    }

    /// The MCTS-backpropagation analogue: a masked, discounted backward
    /// scan over each walker's reward history.
    ///
    /// Under the default policy only walkers about to be overwritten
    /// finalize their trajectory segment's credit; survivors keep
    /// accumulating implicitly by continuing to exist. The final iteration
    /// backs up unconditionally so every walker ends the search with at
    /// least one visit, keeping the final value average well-defined.
    fn backup(&mut self, iteration: usize, k: usize, clone_mask: &Array1<bool>) {
        let unconditional = iteration == k - 1
            || self.config.backup_policy == BackupPolicy::EveryIteration;
        let mask: Array1<bool> = if unconditional {
            Array1::from_elem(self.config.num_walkers, true)
        } else {
            clone_mask.clone()
        };

        let gamma = self.config.gamma;
        let mut current = Array1::<f32>::zeros(self.config.num_walkers);
        for column in (0..=iteration).rev() {
            Zip::from(&mut current)
                .and(self.batch.reward_buffer.column(column))
                .and(&mask)
                .for_each(|value, &reward, &backed_up| {
                    if backed_up {
                        *value = reward + gamma * *value;
                    }
                });
        }

        // Unmasked walkers keep `current` at zero and contribute nothing.
        self.batch.value_sums += &current;
        Zip::from(&mut self.batch.visits)
            .and(&mask)
            .for_each(|visits, &backed_up| {
                if backed_up {
                    *visits += 1;
                }
            });

        self.root_value_sum += current.sum();
        self.root_visits += mask.iter().filter(|&&backed_up| backed_up).count() as u32;

        self.observer.on_backup(&BackupStats {
            iteration,
            mean_value_sum: mean(&self.batch.value_sums),
            mean_visits: self.batch.visits.sum() as f32 / self.config.num_walkers as f32,
        });
    }

    /// Pick the root action of the walker with the highest average value.
    fn select_root_action(&self) -> SearchResult<D::Action> {
        let mut best_walker = 0;
        let mut best_value = f32::NEG_INFINITY;
        for walker in 0..self.config.num_walkers {
            let visits = self.batch.visits[walker];
            // INVARIANT: the final-iteration unconditional backup visited
            // every walker. A zero here is a defect, not a recoverable state.
            assert!(
                visits > 0,
                "BUG: walker {walker} finished the search with zero visits"
            );
            let value = self.batch.value_sums[walker] / visits as f32;
            // Strict comparison: first index wins ties.
            if value > best_value {
                best_value = value;
                best_walker = walker;
            }
        }

        SearchResult {
            best_action: self.batch.root_actions[best_walker].clone(),
            root_value: self.root_value_sum / self.root_visits as f32,
        }
    }

    /// The walker bookkeeping of the most recent `simulate` call.
    pub fn batch(&self) -> &WalkerBatch<D::Action> {
        &self.batch
    }

    /// The dynamics model (and with it the batched hidden state).
    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    /// The observer, e.g. to read back recorded lineage after a search.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

fn mean(values: &Array1<f32>) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.sum() / values.len() as f32
    }
}
