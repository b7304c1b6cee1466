//! Per-session weight update computation
//!
//! Combines three forces into one bounded delta per dimension:
//!
//! 1. **Energy descent**: follow the negative energy gradient.
//! 2. **Outcome reinforcement**: push credited dimensions in the direction of
//!    the baseline-adjusted outcome.
//! 3. **Replicator-mutator**: above-average-fitness dimensions grow share;
//!    the mutation floor keeps a floored dimension revivable.
//!
//! While the energy norm is above its floor, a convergence guard rescales the
//! outcome and replicator terms so descent direction stays dominant. Near a
//! minimum the guard stands down, letting the other forces move weights past
//! shallow basins.

use std::cmp::Ordering;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use anima_common::numeric::{clamp_finite, finite_or, l2_norm, mean, sanitize, variance};
use anima_common::{densify, AnimaError, Attribution, Result};

use super::audit::SignalSnapshot;
use super::config::{OptimizerConfig, DEFAULT_DECLARATION_THRESHOLD};
use super::state::OptimizerState;

/// Energy-term norm at or below which the landscape counts as converged
const ENERGY_NORM_FLOOR: f64 = 1e-6;

/// Attribution history entries required before meta-rates adapt
const PLASTICITY_WARMUP: usize = 3;

/// Dimensions named in the explanation text
const EXPLAINED_DIMENSIONS: usize = 3;

/// Conservation check tolerance
const CONSERVATION_TOLERANCE: f64 = 1e-10;

/// Result of one per-session update computation
///
/// Term vectors are guard-scaled but unclipped, so the caller can audit how
/// much each force contributed before the clip. `fitness` and `meta_rates`
/// are fresh copies of the post-session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightUpdate {
    /// Clipped per-dimension weight delta
    pub delta: Vec<f64>,
    /// Energy-descent component
    pub energy_term: Vec<f64>,
    /// Outcome-reinforcement component
    pub outcome_term: Vec<f64>,
    /// Replicator-mutator component
    pub replicator_term: Vec<f64>,
    /// Dimensions whose movement exceeds the declaration threshold
    pub declare: Vec<bool>,
    /// Top movements and their dominant force, for logs and declarations
    pub explanation: String,
    /// Fitness EMA after this session
    pub fitness: Vec<f64>,
    /// Meta-rates after this session
    pub meta_rates: Vec<f64>,
}

impl WeightUpdate {
    /// Inert update for a zero-dimension identity
    fn empty() -> Self {
        Self {
            delta: Vec::new(),
            energy_term: Vec::new(),
            outcome_term: Vec::new(),
            replicator_term: Vec::new(),
            declare: Vec::new(),
            explanation: String::from("no dimensions to update"),
            fitness: Vec::new(),
            meta_rates: Vec::new(),
        }
    }
}

/// Outcome of a replicator conservation check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConservationCheck {
    /// Whether the weighted fitness deviations cancel within tolerance
    pub conserved: bool,
    /// The computed sum Σ w·(f - f̄)
    pub sum: f64,
}

/// Weight-evolution optimizer
///
/// Holds configuration only; per-identity state is threaded explicitly by the
/// caller, one completed session at a time.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    /// Create an optimizer with the given configuration
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Access the active configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Compute the bounded weight delta for one completed session.
    ///
    /// Mutates `state` in place (fitness, meta-rates, histories, session
    /// counter); never mutates `weights`. Fails only on a length mismatch
    /// between the weight vector and the gradient or state arrays; every
    /// non-finite numeric input is locally replaced with its documented
    /// fallback instead.
    #[instrument(skip_all, fields(dimensions = weights.len(), session = state.session_count))]
    pub fn compute_update(
        &self,
        weights: &[f64],
        energy_gradient: &[f64],
        adjusted_outcome: f64,
        raw_outcome: f64,
        attributions: &[Attribution],
        state: &mut OptimizerState,
        declaration_threshold: f64,
    ) -> Result<WeightUpdate> {
        let n = weights.len();
        if n == 0 {
            return Ok(WeightUpdate::empty());
        }
        check_length("energy_gradient", n, energy_gradient.len())?;
        check_length("state.fitness", n, state.fitness.len())?;
        check_length("state.meta_rates", n, state.meta_rates.len())?;

        let cfg = &self.config;
        let adjusted = finite_or(adjusted_outcome, 0.0);
        let raw = finite_or(raw_outcome, 0.0);
        let threshold = finite_or(declaration_threshold, DEFAULT_DECLARATION_THRESHOLD);
        let w = sanitize(weights);
        let gradient = sanitize(energy_gradient);
        let attr = densify(attributions, n);

        // 1. Fitness EMA over the *raw* outcome. The adjusted outcome
        // oscillates around its baseline and would erode fitness during
        // winning streaks. Uncorrected on purpose: early sessions contribute
        // weakly, giving a confidence-weighted cold start.
        let gamma = cfg.fitness_decay;
        for i in 0..n {
            state.fitness[i] = (1.0 - gamma) * state.fitness[i] + gamma * raw * attr[i].abs();
        }

        // 2. Mean fitness and attribution history
        let mean_fitness = mean(&state.fitness);
        state.push_attribution(attr.clone());

        // 3. Rate-scaled component terms
        let mut energy_term = vec![0.0; n];
        let mut outcome_term = vec![0.0; n];
        let mut replicator_term = vec![0.0; n];
        for i in 0..n {
            let meta = state.meta_rates[i];
            energy_term[i] = -cfg.energy_rate * meta * gradient[i];
            outcome_term[i] = cfg.outcome_rate * meta * adjusted * attr[i];
            replicator_term[i] = cfg.replicator_rate
                * meta
                * (w[i] + cfg.mutation_floor)
                * (state.fitness[i] - mean_fitness);
        }

        // 4. Convergence guard: while still descending, the steering forces
        // may not outweigh the energy term. At the floor the guard stands
        // down so weights can leave shallow minima.
        let energy_norm = l2_norm(&energy_term);
        let steering_norm = l2_norm(&outcome_term) + l2_norm(&replicator_term);
        if energy_norm > ENERGY_NORM_FLOOR && energy_norm < steering_norm {
            let scale = energy_norm / steering_norm;
            for i in 0..n {
                outcome_term[i] *= scale;
                replicator_term[i] *= scale;
            }
            debug!(scale, energy_norm, steering_norm, "convergence guard engaged");
        }

        // 5. Combine and clip
        let delta: Vec<f64> = (0..n)
            .map(|i| {
                let sum = energy_term[i] + outcome_term[i] + replicator_term[i];
                clamp_finite(sum, -cfg.clip_gradient, cfg.clip_gradient, 0.0)
            })
            .collect();

        // 6. Neuroplasticity: high-variance dimensions explore faster,
        // stable ones exploit. Needs a minimal history window first.
        if state.recent_attributions.len() >= PLASTICITY_WARMUP {
            for i in 0..n {
                let series: Vec<f64> = state
                    .recent_attributions
                    .iter()
                    .map(|entry| entry.get(i).copied().unwrap_or(0.0))
                    .collect();
                let spread = variance(&series);
                let adapted = state.meta_rates[i]
                    * (1.0 + cfg.plasticity_rate * (spread - cfg.plasticity_target));
                state.meta_rates[i] =
                    clamp_finite(adapted, cfg.meta_rate_min, cfg.meta_rate_max, 1.0);
            }
        }

        // 7. Session bookkeeping, declarations, audit snapshot
        state.session_count += 1;
        let declare: Vec<bool> = delta.iter().map(|d| d.abs() > threshold).collect();
        let explanation = explain(&delta, &energy_term, &outcome_term, &replicator_term);
        let post_weights = apply_delta(&w, &delta, cfg);

        state.push_snapshot(SignalSnapshot {
            id: Some(Uuid::new_v4()),
            session: state.session_count,
            timestamp: Utc::now().timestamp_millis(),
            raw_outcome: raw,
            adjusted_outcome: adjusted,
            signals: delta.clone(),
            pre_weights: Some(w),
            post_weights: Some(post_weights),
            energy_term: Some(energy_term.clone()),
            outcome_term: Some(outcome_term.clone()),
            replicator_term: Some(replicator_term.clone()),
            attributions: Some(attr),
            meta_rates: Some(state.meta_rates.clone()),
            fitness: Some(state.fitness.clone()),
            explanation: Some(explanation.clone()),
        });

        debug!(session = state.session_count, %explanation, "weight update computed");

        Ok(WeightUpdate {
            delta,
            energy_term,
            outcome_term,
            replicator_term,
            declare,
            explanation,
            fitness: state.fitness.clone(),
            meta_rates: state.meta_rates.clone(),
        })
    }

    /// Apply an update to a weight vector, clamped to the configured bounds.
    ///
    /// Pure: returns a new vector. A non-finite delta leaves that dimension's
    /// weight untouched.
    pub fn apply_update(&self, weights: &[f64], update: &WeightUpdate) -> Vec<f64> {
        apply_delta(weights, &update.delta, &self.config)
    }
}

fn apply_delta(weights: &[f64], delta: &[f64], cfg: &OptimizerConfig) -> Vec<f64> {
    weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let next = w + delta.get(i).copied().unwrap_or(0.0);
            if next.is_finite() {
                next.clamp(cfg.min_weight, cfg.max_weight)
            } else {
                w
            }
        })
        .collect()
}

fn check_length(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AnimaError::LengthMismatch {
            context,
            expected,
            actual,
        })
    }
}

/// Diagnostic check of the replicator conservation property.
///
/// With the fitness baseline taken as the weight-weighted mean, the
/// replicator flow satisfies Σ w·(f - f̄) = 0 algebraically. The full update
/// breaks this on purpose (energy and outcome terms are external forces), so
/// this is a consistency probe, not an invariant of `compute_update`.
pub fn verify_conservation(weights: &[f64], fitness: &[f64]) -> ConservationCheck {
    let w = sanitize(weights);
    let f = sanitize(fitness);
    let total: f64 = w.iter().sum();
    let weighted_mean = if total.abs() > f64::EPSILON {
        w.iter().zip(&f).map(|(&wi, &fi)| wi * fi).sum::<f64>() / total
    } else {
        0.0
    };
    let sum: f64 = w
        .iter()
        .zip(&f)
        .map(|(&wi, &fi)| wi * (fi - weighted_mean))
        .sum();
    ConservationCheck {
        conserved: sum.abs() <= CONSERVATION_TOLERANCE,
        sum,
    }
}

/// Name the top movements and which force drove each of them
fn explain(delta: &[f64], energy: &[f64], outcome: &[f64], replicator: &[f64]) -> String {
    let mut order: Vec<usize> = (0..delta.len()).collect();
    order.sort_by(|&a, &b| {
        delta[b]
            .abs()
            .partial_cmp(&delta[a].abs())
            .unwrap_or(Ordering::Equal)
    });

    let parts: Vec<String> = order
        .iter()
        .take(EXPLAINED_DIMENSIONS)
        .map(|&i| {
            let term = dominant_term(energy[i], outcome[i], replicator[i]);
            format!("dim {}: {:+.4} ({})", i, delta[i], term)
        })
        .collect();

    if parts.is_empty() {
        String::from("no dimensions updated")
    } else {
        parts.join("; ")
    }
}

fn dominant_term(energy: f64, outcome: f64, replicator: f64) -> &'static str {
    let e = energy.abs();
    let o = outcome.abs();
    let r = replicator.abs();
    if e >= o && e >= r {
        "energy"
    } else if o >= r {
        "outcome"
    } else {
        "replicator"
    }
}
