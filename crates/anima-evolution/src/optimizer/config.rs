//! Optimizer configuration

use serde::{Deserialize, Serialize};

/// Default declaration threshold when the caller passes a non-finite one
pub const DEFAULT_DECLARATION_THRESHOLD: f64 = 0.05;

/// Tuning knobs for the weight-evolution optimizer
///
/// Defaults are calibrated for small dimension counts (the identity layer
/// caps out at 16 behavioral dimensions) and conservative per-session drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Learning rate for the energy-descent term (α_e)
    pub energy_rate: f64,
    /// Learning rate for the outcome-reinforcement term (α_o)
    pub outcome_rate: f64,
    /// Learning rate for the replicator-mutator term (α_r)
    pub replicator_rate: f64,
    /// Fitness EMA decay (γ); higher reacts faster to recent sessions
    pub fitness_decay: f64,
    /// Per-dimension clip on the combined update magnitude
    pub clip_gradient: f64,
    /// Lower bound for applied weights
    pub min_weight: f64,
    /// Upper bound for applied weights
    pub max_weight: f64,
    /// Attribution variance level the meta-rates steer toward
    pub plasticity_target: f64,
    /// Multiplicative step for meta-rate adaptation
    pub plasticity_rate: f64,
    /// Lower bound for per-dimension meta-rates
    pub meta_rate_min: f64,
    /// Upper bound for per-dimension meta-rates
    pub meta_rate_max: f64,
    /// Mutation floor (μ) keeping a zero-weight dimension revivable
    pub mutation_floor: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            energy_rate: 0.01,
            outcome_rate: 0.05,
            replicator_rate: 0.02,
            fitness_decay: 0.1,
            clip_gradient: 0.1,
            min_weight: 0.01,
            max_weight: 0.99,
            plasticity_target: 0.01,
            plasticity_rate: 0.1,
            meta_rate_min: 0.5,
            meta_rate_max: 2.0,
            mutation_floor: 1e-6,
        }
    }
}
