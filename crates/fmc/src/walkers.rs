//! Per-walker bookkeeping for one search.
//!
//! A walker is nothing more than a row across these arrays plus a row of the
//! dynamics model's hidden state; all arrays share the leading dimension
//! `num_walkers` at all times.

use ndarray::{Array1, Array2, ArrayViewMut2};

/// The batched bookkeeping state of the walker population.
///
/// Created fresh at the start of each `simulate` call and discarded once the
/// root action is extracted. The walker hidden state itself lives inside the
/// dynamics model; clone execution receives a mutable view of it so that all
/// tracked arrays move together.
#[derive(Clone, Debug)]
pub struct WalkerBatch<A> {
    /// Action each walker took at the current iteration.
    pub actions: Vec<A>,

    /// Action each walker took at iteration 0. Snapshotted, not aliased:
    /// later `actions` overwrites do not touch it, only cloning does. This
    /// is the quantity the search ultimately selects among.
    pub root_actions: Vec<A>,

    /// Reward per walker per iteration, shape `(num_walkers, k)`.
    pub reward_buffer: Array2<f32>,

    /// Discounted reward accumulated by the backup step.
    pub value_sums: Array1<f32>,

    /// Number of backups each walker has received.
    pub visits: Array1<u32>,
}

impl<A: Clone> WalkerBatch<A> {
    /// Create zeroed bookkeeping for `num_walkers` walkers and a search of
    /// depth `k`.
    pub fn new(num_walkers: usize, k: usize) -> Self {
        Self {
            actions: Vec::with_capacity(num_walkers),
            root_actions: Vec::with_capacity(num_walkers),
            reward_buffer: Array2::zeros((num_walkers, k)),
            value_sums: Array1::zeros(num_walkers),
            visits: Array1::zeros(num_walkers),
        }
    }

    /// Number of walkers in the population.
    pub fn num_walkers(&self) -> usize {
        self.value_sums.len()
    }

    /// Overwrite every masked walker's full tracked state (hidden state row,
    /// actions, root action, reward history, value/visit accumulators) with
    /// its partner's.
    ///
    /// All arrays are updated from the same `(partners, mask)` snapshot, and
    /// partner rows are read as they were before any overwrite in this call;
    /// partial application would corrupt the walker/action/reward
    /// correspondence.
    ///
    /// Must only be called after the first perturbation has filled `actions`
    /// and `root_actions`.
    pub fn execute_clone(
        &mut self,
        state: ArrayViewMut2<'_, f32>,
        partners: &Array1<usize>,
        mask: &Array1<bool>,
    ) {
        clone_rows(state, partners, mask);
        clone_rows(self.reward_buffer.view_mut(), partners, mask);
        clone_slots(&mut self.value_sums, partners, mask);
        clone_slots(&mut self.visits, partners, mask);
        clone_vec(&mut self.actions, partners, mask);
        clone_vec(&mut self.root_actions, partners, mask);
    }
}

/// Row-wise clone over a 2-D array: masked rows take their partner's row.
///
/// Partner rows are gathered before any write so that a walker cloning from
/// a partner that is itself cloning sees the partner's pre-clone row.
fn clone_rows(mut array: ArrayViewMut2<'_, f32>, partners: &Array1<usize>, mask: &Array1<bool>) {
    let sources: Vec<(usize, Array1<f32>)> = mask
        .iter()
        .enumerate()
        .filter(|&(_, &cloned)| cloned)
        .map(|(i, _)| (i, array.row(partners[i]).to_owned()))
        .collect();

    for (i, row) in sources {
        array.row_mut(i).assign(&row);
    }
}

/// Element-wise clone over a 1-D array.
fn clone_slots<T: Copy>(array: &mut Array1<T>, partners: &Array1<usize>, mask: &Array1<bool>) {
    let sources: Vec<(usize, T)> = mask
        .iter()
        .enumerate()
        .filter(|&(_, &cloned)| cloned)
        .map(|(i, _)| (i, array[partners[i]]))
        .collect();

    for (i, value) in sources {
        array[i] = value;
    }
}

/// Element-wise clone over per-walker actions.
fn clone_vec<A: Clone>(values: &mut [A], partners: &Array1<usize>, mask: &Array1<bool>) {
    let sources: Vec<(usize, A)> = mask
        .iter()
        .enumerate()
        .filter(|&(_, &cloned)| cloned)
        .map(|(i, _)| (i, values[partners[i]].clone()))
        .collect();

    for (i, value) in sources {
        values[i] = value;
    }
}
