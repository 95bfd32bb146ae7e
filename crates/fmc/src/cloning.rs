//! The cloning-phase math, as pure functions over the walker population.
//!
//! Each search iteration pairs every walker with a uniformly random partner
//! and computes a "virtual reward" balancing predicted value against
//! behavioral distance from that partner. Walkers whose partner looks better
//! are stochastically overwritten with the partner's state. Keeping these
//! steps as free functions over plain arrays makes each one testable in
//! isolation.

use ndarray::{Array1, ArrayView2};

/// Substituted for a walker's own virtual reward in the clone-probability
/// denominator when that reward is not positive. Deliberately tiny: a walker
/// with no virtual reward of its own should be almost certain to clone away.
pub const VIRTUAL_REWARD_EPSILON: f32 = 1e-8;

/// Rescale a raw signal to an iteration-invariant range.
///
/// Computes the z-score of each entry (using the sample standard deviation),
/// then maps positive z to `ln(1 + z) + 1` and non-positive z to `exp(z)`.
/// The result keeps its ordering but lives in a roughly fixed range
/// regardless of the raw magnitudes, so rewards and distances from wildly
/// different domains stay comparable across iterations.
///
/// Degenerate inputs (fewer than two entries, zero variance, non-finite
/// spread) carry no signal and map to a constant vector of ones.
pub fn relativize(values: &Array1<f32>) -> Array1<f32> {
    let n = values.len();
    if n < 2 {
        return Array1::ones(n);
    }
    // Checked directly rather than via the variance: float rounding can
    // leave a constant vector with a tiny nonzero variance, which would
    // turn pure noise into a huge z-score.
    if values.iter().all(|v| *v == values[0]) {
        return Array1::ones(n);
    }

    let mean = values.sum() / n as f32;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / (n as f32 - 1.0);
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return Array1::ones(n);
    }

    values.mapv(|v| {
        let z = (v - mean) / std;
        if z > 0.0 {
            (1.0 + z).ln() + 1.0
        } else {
            z.exp()
        }
    })
}

/// Euclidean distance between each walker's state row and its partner's.
pub fn pairwise_distances(state: &ArrayView2<'_, f32>, partners: &Array1<usize>) -> Array1<f32> {
    Array1::from_shape_fn(partners.len(), |i| {
        let diff = &state.row(i) - &state.row(partners[i]);
        diff.dot(&diff).sqrt()
    })
}

/// Composite exploration/exploitation signal per walker.
///
/// Both inputs are relativized independently, then combined as
/// `value^balance * distance`.
pub fn virtual_rewards(
    predicted_values: &Array1<f32>,
    distances: &Array1<f32>,
    balance: f32,
) -> Array1<f32> {
    relativize(predicted_values).mapv(|v| v.powf(balance)) * &relativize(distances)
}

/// Probability for each walker to clone onto its partner:
/// `(vr[partner] - vr[walker]) / vr[walker]`.
///
/// A non-positive own virtual reward gets [`VIRTUAL_REWARD_EPSILON`] as the
/// denominator instead, which makes the probability enormous whenever the
/// partner has any positive signal. The result is intentionally unclamped,
/// and can also be large and negative when both sides are non-positive;
/// search quality characteristics may depend on this, so revisit with care.
pub fn clone_probabilities(virtual_rewards: &Array1<f32>, partners: &Array1<usize>) -> Array1<f32> {
    Array1::from_shape_fn(virtual_rewards.len(), |i| {
        let own = virtual_rewards[i];
        let denom = if own > 0.0 { own } else { VIRTUAL_REWARD_EPSILON };
        (virtual_rewards[partners[i]] - own) / denom
    })
}

/// Threshold the clone probabilities against a single shared draw.
///
/// One threshold `r` is drawn per iteration and shared by the whole
/// population, so it is the relative ranking of probabilities that decides
/// who clones, not independent per-walker coin flips. Per-walker thresholds
/// would change the search statistics.
pub fn clone_mask(probabilities: &Array1<f32>, threshold: f32) -> Array1<bool> {
    probabilities.mapv(|p| p >= threshold)
}
