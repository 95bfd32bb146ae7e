//! Walker lineage reconstruction.
//!
//! FMC never materializes a tree, but the per-iteration (partners, mask)
//! pairs are enough to rebuild one after the fact: a cloned walker's lineage
//! continues from its partner's pre-clone row, a surviving walker's from its
//! own. [`LineageRecorder`] captures those pairs as a [`SearchObserver`];
//! [`LineageGraph`] turns them into parent edges for inspection or
//! rendering. Entirely derivable and decorative; never consulted by the
//! search itself.

use crate::observer::{CloneEvent, SearchObserver};
use ndarray::Array1;

/// A walker's row at a specific iteration boundary.
///
/// `iteration` 0 is the population as seeded from the root state;
/// `iteration` t is the population after t full search iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineageNode {
    pub iteration: usize,
    pub walker: usize,
}

/// One recorded clone decision.
#[derive(Clone, Debug)]
struct CloneStep {
    partners: Array1<usize>,
    mask: Array1<bool>,
}

/// Observer that records every clone decision of one `simulate` call.
#[derive(Clone, Debug, Default)]
pub struct LineageRecorder {
    steps: Vec<CloneStep>,
}

impl LineageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded iterations.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Build the lineage graph for the recorded search.
    pub fn graph(&self) -> LineageGraph {
        LineageGraph {
            steps: self.steps.clone(),
        }
    }
}

impl SearchObserver for LineageRecorder {
    fn on_cloning(&mut self, event: &CloneEvent<'_>) {
        self.steps.push(CloneStep {
            partners: event.partners.clone(),
            mask: event.mask.clone(),
        });
    }
}

/// Parent relationships reconstructed from recorded clone decisions.
#[derive(Clone, Debug)]
pub struct LineageGraph {
    steps: Vec<CloneStep>,
}

impl LineageGraph {
    /// Number of search iterations covered by the graph.
    pub fn iterations(&self) -> usize {
        self.steps.len()
    }

    /// The node a walker's row descended from across one iteration.
    ///
    /// `node.iteration` must be in `1..=iterations()`; the parent sits at
    /// `node.iteration - 1` and is the walker's clone partner if the walker
    /// cloned that iteration, otherwise the walker itself.
    pub fn parent(&self, node: LineageNode) -> LineageNode {
        assert!(
            node.iteration >= 1 && node.iteration <= self.steps.len(),
            "lineage node iteration {} out of range 1..={}",
            node.iteration,
            self.steps.len()
        );

        let step = &self.steps[node.iteration - 1];
        let walker = if step.mask[node.walker] {
            step.partners[node.walker]
        } else {
            node.walker
        };
        LineageNode {
            iteration: node.iteration - 1,
            walker,
        }
    }

    /// The row at iteration 0 a walker's final state descends from.
    pub fn root_ancestor(&self, walker: usize) -> usize {
        let mut node = LineageNode {
            iteration: self.steps.len(),
            walker,
        };
        while node.iteration > 0 {
            node = self.parent(node);
        }
        node.walker
    }

    /// All parent edges as `(child, parent)` pairs, for rendering.
    pub fn edges(&self) -> Vec<(LineageNode, LineageNode)> {
        let mut edges = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            for walker in 0..step.mask.len() {
                let child = LineageNode {
                    iteration: index + 1,
                    walker,
                };
                edges.push((child, self.parent(child)));
            }
        }
        edges
    }
}
