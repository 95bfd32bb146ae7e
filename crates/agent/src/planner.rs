//! Observation-to-action planning via FMC lookahead.

use anyhow::ensure;
use fractal_core::{DynamicsModel, PredictionModel, RepresentationModel, Result};
use fractal_fmc::{Fmc, SearchResult, SearchObserver};
use rand::Rng;

/// Plans actions by running FMC over a learned model.
///
/// The planner owns the search (and through it the dynamics and prediction
/// models) plus the representation model that maps raw observations into
/// the embedding space the search operates in.
pub struct Planner<Rp, D, P, R, O>
where
    Rp: RepresentationModel,
    D: DynamicsModel,
    P: PredictionModel,
    R: Rng,
    O: SearchObserver,
{
    representation: Rp,
    fmc: Fmc<D, P, R, O>,
    lookahead: usize,
}

impl<Rp, D, P, R, O> Planner<Rp, D, P, R, O>
where
    Rp: RepresentationModel,
    D: DynamicsModel,
    P: PredictionModel,
    R: Rng,
    O: SearchObserver,
{
    /// Create a planner that searches `lookahead` steps deep per action.
    ///
    /// # Errors
    /// Returns an error if `lookahead` is zero; a planner that never looks
    /// ahead would need a policy head instead of a search.
    pub fn new(representation: Rp, fmc: Fmc<D, P, R, O>, lookahead: usize) -> anyhow::Result<Self> {
        ensure!(lookahead > 0, "lookahead must be positive, got {lookahead}");
        Ok(Self {
            representation,
            fmc,
            lookahead,
        })
    }

    /// Encode the observation and run one search from it.
    pub fn act(&mut self, observation: &Rp::Observation) -> Result<SearchResult<D::Action>> {
        let root = self.representation.represent(observation);
        self.fmc.simulate(root.view(), self.lookahead)
    }

    /// Search depth used per `act` call.
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// The underlying search, e.g. to inspect walker bookkeeping or the
    /// observer after an `act` call.
    pub fn fmc(&self) -> &Fmc<D, P, R, O> {
        &self.fmc
    }

    pub fn fmc_mut(&mut self) -> &mut Fmc<D, P, R, O> {
        &mut self.fmc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractal_fmc::toy::{IdentityRepresentation, LinearDynamics, SumValue};
    use fractal_fmc::{Fmc, FmcConfig, NoopObserver};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn toy_fmc(num_walkers: usize) -> Fmc<LinearDynamics, SumValue, ChaCha8Rng, NoopObserver> {
        Fmc::new(
            FmcConfig::with_walkers(num_walkers),
            LinearDynamics::new(3),
            SumValue,
            ChaCha8Rng::seed_from_u64(21),
        )
    }

    #[test]
    fn test_act_plans_from_encoded_observation() {
        let mut planner = Planner::new(IdentityRepresentation, toy_fmc(8), 4).unwrap();

        let result = planner.act(&vec![0.5, -0.5, 0.0]).unwrap();

        assert!(result.root_value.is_finite());
        assert!(result.best_action >= -1.0 && result.best_action < 1.0);
        // The search ran at the configured depth.
        assert_eq!(planner.fmc().batch().reward_buffer.dim(), (8, 4));
    }

    #[test]
    fn test_zero_lookahead_rejected_at_construction() {
        assert!(Planner::new(IdentityRepresentation, toy_fmc(4), 0).is_err());
    }

    #[test]
    fn test_observation_length_must_match_embedding() {
        let mut planner = Planner::new(IdentityRepresentation, toy_fmc(4), 2).unwrap();
        assert!(planner.act(&vec![1.0, 2.0]).is_err());
    }
}
