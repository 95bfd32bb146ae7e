//! End-to-end searches against the toy models, including the recorded
//! lineage and the metrics observer plumbing.

use fractal_core::{DynamicsModel, FractalError};
use fractal_fmc::lineage::LineageRecorder;
use fractal_fmc::observer::{CloneEvent, SearchObserver};
use fractal_fmc::toy::{LinearDynamics, SumValue};
use fractal_fmc::{Fmc, FmcConfig, MetricsLogger};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn search_from_nonzero_root_broadcasts_to_all_walkers() {
    let mut fmc = Fmc::new(
        FmcConfig::with_walkers(6),
        LinearDynamics::with_script(3, vec![0.0]),
        SumValue,
        ChaCha8Rng::seed_from_u64(11),
    );

    let root = Array1::from(vec![1.0, 2.0, 3.0]);
    fmc.simulate(root.view(), 1).unwrap();

    // Zero actions leave the broadcast root untouched in every row.
    for row in fmc.dynamics().state().rows() {
        assert_eq!(row, root.view());
    }
}

#[test]
fn zero_lookahead_is_rejected_before_any_mutation() {
    let mut fmc = Fmc::new(
        FmcConfig::with_walkers(4),
        LinearDynamics::new(2),
        SumValue,
        ChaCha8Rng::seed_from_u64(0),
    );

    let err = fmc.simulate(Array1::zeros(2).view(), 0).unwrap_err();
    assert!(matches!(err, FractalError::InvalidLookahead(0)));
    // No walker state was created.
    assert_eq!(fmc.dynamics().state().nrows(), 0);
}

#[test]
fn empty_population_is_rejected() {
    let mut fmc = Fmc::new(
        FmcConfig::with_walkers(0),
        LinearDynamics::new(2),
        SumValue,
        ChaCha8Rng::seed_from_u64(0),
    );

    let err = fmc.simulate(Array1::zeros(2).view(), 3).unwrap_err();
    assert!(matches!(err, FractalError::EmptyPopulation));
}

#[test]
fn lineage_recorder_covers_every_iteration() {
    let recorder = LineageRecorder::new();
    let mut fmc = Fmc::with_observer(
        FmcConfig::with_walkers(8),
        LinearDynamics::new(2),
        SumValue,
        ChaCha8Rng::seed_from_u64(5),
        recorder,
    );

    fmc.simulate(Array1::zeros(2).view(), 6).unwrap();

    let graph = fmc.observer().graph();
    assert_eq!(graph.iterations(), 6);

    // Every walker's lineage resolves to some row of the initial population.
    for walker in 0..8 {
        assert!(graph.root_ancestor(walker) < 8);
    }
}

/// Observer that records clone counts, to check events fire once per
/// iteration and the reported counts match the mask.
#[derive(Default)]
struct CloneCounts {
    per_iteration: Vec<usize>,
}

impl SearchObserver for CloneCounts {
    fn on_cloning(&mut self, event: &CloneEvent<'_>) {
        assert_eq!(event.iteration, self.per_iteration.len());
        assert_eq!(
            event.num_cloned,
            event.mask.iter().filter(|&&cloned| cloned).count()
        );
        self.per_iteration.push(event.num_cloned);
    }
}

#[test]
fn observer_sees_one_clone_event_per_iteration() {
    let mut fmc = Fmc::with_observer(
        FmcConfig::with_walkers(5),
        LinearDynamics::new(2),
        SumValue,
        ChaCha8Rng::seed_from_u64(9),
        CloneCounts::default(),
    );

    fmc.simulate(Array1::zeros(2).view(), 4).unwrap();
    assert_eq!(fmc.observer().per_iteration.len(), 4);
}

#[test]
fn metrics_logger_does_not_disturb_the_search() {
    let run = |with_logger: bool| {
        let config = FmcConfig::with_walkers(4);
        let dynamics = LinearDynamics::new(2);
        let rng = ChaCha8Rng::seed_from_u64(17);
        if with_logger {
            Fmc::with_observer(config, dynamics, SumValue, rng, MetricsLogger)
                .simulate(Array1::zeros(2).view(), 3)
                .unwrap()
        } else {
            Fmc::new(config, dynamics, SumValue, rng)
                .simulate(Array1::zeros(2).view(), 3)
                .unwrap()
        }
    };

    let logged = run(true);
    let silent = run(false);
    assert_eq!(logged.best_action, silent.best_action);
    assert!((logged.root_value - silent.root_value).abs() < 1e-6);
}

#[test]
fn reusing_the_search_resets_all_bookkeeping() {
    let mut fmc = Fmc::new(
        FmcConfig::with_walkers(4),
        LinearDynamics::new(2),
        SumValue,
        ChaCha8Rng::seed_from_u64(13),
    );

    fmc.simulate(Array1::zeros(2).view(), 5).unwrap();
    fmc.simulate(Array1::zeros(2).view(), 2).unwrap();

    // The second search's buffers reflect k = 2, not the earlier k = 5.
    assert_eq!(fmc.batch().reward_buffer.dim(), (4, 2));
    assert!(fmc.batch().visits.iter().all(|&v| v >= 1 && v <= 2));
}
