//! FMC search configuration parameters.

use serde::{Deserialize, Serialize};

/// When the backward value scan runs for a walker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Back up a walker only when it is about to be overwritten by cloning,
    /// plus every walker unconditionally on the final iteration. The final
    /// sweep guarantees each walker ends the search with at least one visit.
    CloneAndFinal,

    /// Back up every walker on every iteration.
    EveryIteration,
}

/// FMC search configuration parameters.
///
/// The search depth `k` is not part of the config; it is chosen per
/// `simulate` call, matching how lookahead varies between training and
/// evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmcConfig {
    /// Number of walkers in the population. Fixed for the lifetime of a
    /// search; must be at least 1.
    pub num_walkers: usize,

    /// Exploitation exponent applied to the relativized value signal when
    /// forming the virtual reward:
    /// `vr = value_relativized^balance * distance_relativized`.
    /// 1.0 weighs exploration and exploitation equally; higher values favor
    /// exploitation.
    pub balance: f32,

    /// Discount factor for the backward value scan.
    pub gamma: f32,

    /// When walkers back up their reward history.
    pub backup_policy: BackupPolicy,
}

impl Default for FmcConfig {
    fn default() -> Self {
        Self {
            num_walkers: 64,
            balance: 1.0,
            gamma: 0.99,
            backup_policy: BackupPolicy::CloneAndFinal,
        }
    }
}

impl FmcConfig {
    /// Create a config with the specified number of walkers.
    pub fn with_walkers(num_walkers: usize) -> Self {
        Self {
            num_walkers,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FmcConfig::default();
        assert_eq!(config.num_walkers, 64);
        assert!((config.balance - 1.0).abs() < 1e-6);
        assert!((config.gamma - 0.99).abs() < 1e-6);
        assert_eq!(config.backup_policy, BackupPolicy::CloneAndFinal);
    }

    #[test]
    fn test_with_walkers() {
        let config = FmcConfig::with_walkers(8);
        assert_eq!(config.num_walkers, 8);
        // Other values should be default
        assert!((config.gamma - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: FmcConfig = serde_json::from_str(r#"{"num_walkers": 8}"#).unwrap();
        assert_eq!(config.num_walkers, 8);
        assert_eq!(config.backup_policy, BackupPolicy::CloneAndFinal);

        let config: FmcConfig =
            serde_json::from_str(r#"{"num_walkers": 4, "backup_policy": "every_iteration"}"#)
                .unwrap();
        assert_eq!(config.backup_policy, BackupPolicy::EveryIteration);
    }
}
