//! Side-effect-only observation of a running search.
//!
//! The search calls an observer at the end of each phase with summary
//! statistics and the raw clone decision. Observers are fire-and-forget:
//! they must not block and cannot influence the search outcome. The default
//! is [`NoopObserver`]; [`MetricsLogger`] forwards the statistics to the
//! `log` facade.

use ndarray::Array1;

/// Statistics emitted after the perturbation phase of one iteration.
#[derive(Clone, Debug)]
pub struct PerturbationStats {
    pub iteration: usize,
    pub mean_reward: f32,
    pub mean_predicted_value: f32,
}

/// The clone decision for one iteration, emitted before it is executed.
#[derive(Clone, Debug)]
pub struct CloneEvent<'a> {
    pub iteration: usize,
    /// Partner index assigned to each walker.
    pub partners: &'a Array1<usize>,
    /// Which walkers will be overwritten with their partner's state.
    pub mask: &'a Array1<bool>,
    pub mean_virtual_reward: f32,
    pub mean_distance: f32,
    pub num_cloned: usize,
}

/// Statistics emitted after the backup phase of one iteration.
#[derive(Clone, Debug)]
pub struct BackupStats {
    pub iteration: usize,
    pub mean_value_sum: f32,
    pub mean_visits: f32,
}

/// Observer hooks called at well-defined points of the search loop.
///
/// All methods default to no-ops, so implementations only override the
/// events they care about.
pub trait SearchObserver {
    /// Called after every walker has been advanced and scored.
    fn on_perturbation(&mut self, _stats: &PerturbationStats) {}

    /// Called once the clone decision for this iteration is fixed, before
    /// it is applied. `CloneEvent` carries enough (partners, mask) data to
    /// reconstruct the full walker lineage.
    fn on_cloning(&mut self, _event: &CloneEvent<'_>) {}

    /// Called after the backup phase has updated the accumulators.
    fn on_backup(&mut self, _stats: &BackupStats) {}

    /// Called once per `simulate` call with the aggregate root value.
    fn on_complete(&mut self, _root_value: f32) {}
}

/// The default observer: ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Logs per-iteration search statistics at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsLogger;

impl SearchObserver for MetricsLogger {
    fn on_perturbation(&mut self, stats: &PerturbationStats) {
        log::debug!(
            "fmc iteration {}: mean_reward={:.4} mean_predicted_value={:.4}",
            stats.iteration,
            stats.mean_reward,
            stats.mean_predicted_value,
        );
    }

    fn on_cloning(&mut self, event: &CloneEvent<'_>) {
        log::debug!(
            "fmc iteration {}: cloned {}/{} walkers, mean_virtual_reward={:.4} mean_distance={:.4}",
            event.iteration,
            event.num_cloned,
            event.mask.len(),
            event.mean_virtual_reward,
            event.mean_distance,
        );
    }

    fn on_backup(&mut self, stats: &BackupStats) {
        log::debug!(
            "fmc iteration {}: mean_value_sum={:.4} mean_visits={:.2}",
            stats.iteration,
            stats.mean_value_sum,
            stats.mean_visits,
        );
    }

    fn on_complete(&mut self, root_value: f32) {
        log::debug!("fmc search complete: root_value={root_value:.4}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Counts events, to check the default methods can be overridden piecemeal.
    #[derive(Default)]
    struct Counter {
        cloning_events: usize,
        completions: usize,
    }

    impl SearchObserver for Counter {
        fn on_cloning(&mut self, event: &CloneEvent<'_>) {
            self.cloning_events += 1;
            assert_eq!(event.partners.len(), event.mask.len());
        }

        fn on_complete(&mut self, _root_value: f32) {
            self.completions += 1;
        }
    }

    #[test]
    fn test_partial_override() {
        let mut observer = Counter::default();
        let partners = array![1usize, 0];
        let mask = array![true, false];

        observer.on_perturbation(&PerturbationStats {
            iteration: 0,
            mean_reward: 0.0,
            mean_predicted_value: 0.0,
        });
        observer.on_cloning(&CloneEvent {
            iteration: 0,
            partners: &partners,
            mask: &mask,
            mean_virtual_reward: 1.0,
            mean_distance: 0.5,
            num_cloned: 1,
        });
        observer.on_complete(0.25);

        assert_eq!(observer.cloning_events, 1);
        assert_eq!(observer.completions, 1);
    }
}
