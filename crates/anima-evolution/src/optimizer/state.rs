//! OptimizerState - per-identity evolution state
//!
//! Created once at identity creation and mutated exactly once per completed
//! session. All per-dimension arrays share the weight vector's length; the
//! owner must call [`OptimizerState::resize`] before changing the dimension
//! count.
//!
//! Three bounded buffers (attribution history, signal history, and the
//! tracker's pattern sets) are evicted eagerly on write, so memory stays O(1)
//! in the number of sessions. The 20-entry windows are load-bearing: the
//! neuroplasticity variance and audit completeness both read them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use anima_common::numeric::finite_or;

use super::audit::SignalSnapshot;

/// Entries retained in the attribution and signal histories
pub const HISTORY_WINDOW: usize = 20;

/// Mutable optimizer state threaded through per-session updates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawOptimizerState")]
pub struct OptimizerState {
    /// Per-dimension fitness: EMA of raw outcome weighted by |attribution|
    pub fitness: Vec<f64>,

    /// Per-dimension adaptive learning-rate multipliers (default 1.0)
    pub meta_rates: Vec<f64>,

    /// Dense attribution vectors from the most recent sessions
    pub recent_attributions: VecDeque<Vec<f64>>,

    /// Completed sessions processed for this identity
    pub session_count: u64,

    /// Audit trail of the most recent updates
    pub signal_history: VecDeque<SignalSnapshot>,
}

impl OptimizerState {
    /// Create fresh state for an identity with `n` dimensions
    pub fn new(n: usize) -> Self {
        Self {
            fitness: vec![0.0; n],
            meta_rates: vec![1.0; n],
            recent_attributions: VecDeque::new(),
            session_count: 0,
            signal_history: VecDeque::new(),
        }
    }

    /// Number of dimensions this state is sized for
    pub fn dimension_count(&self) -> usize {
        self.fitness.len()
    }

    /// Realign per-dimension arrays to a new dimension count.
    ///
    /// New dimensions start at zero fitness and a 1.0 meta-rate. History
    /// entries keep their recorded lengths; readers index them defensively.
    pub fn resize(&mut self, n: usize) {
        self.fitness.resize(n, 0.0);
        self.meta_rates.resize(n, 1.0);
    }

    /// Record a session's dense attribution vector, evicting beyond the window
    pub fn push_attribution(&mut self, attribution: Vec<f64>) {
        self.recent_attributions.push_back(attribution);
        while self.recent_attributions.len() > HISTORY_WINDOW {
            self.recent_attributions.pop_front();
        }
    }

    /// Append an audit snapshot, evicting beyond the window
    pub fn push_snapshot(&mut self, snapshot: SignalSnapshot) {
        self.signal_history.push_back(snapshot);
        while self.signal_history.len() > HISTORY_WINDOW {
            self.signal_history.pop_front();
        }
    }
}

/// Lenient wire shape: every field optional, histories as raw JSON values so
/// one corrupt entry never fails the whole load
#[derive(Deserialize)]
struct RawOptimizerState {
    #[serde(default)]
    fitness: Vec<Value>,
    #[serde(default)]
    meta_rates: Vec<Value>,
    #[serde(default)]
    recent_attributions: Vec<Value>,
    #[serde(default)]
    session_count: u64,
    #[serde(default)]
    signal_history: Vec<Value>,
}

impl From<RawOptimizerState> for OptimizerState {
    fn from(raw: RawOptimizerState) -> Self {
        let fitness: Vec<f64> = raw
            .fitness
            .iter()
            .map(|v| finite_or(v.as_f64().unwrap_or(0.0), 0.0))
            .collect();

        let meta_rates: Vec<f64> = raw
            .meta_rates
            .iter()
            .map(|v| finite_or(v.as_f64().unwrap_or(1.0), 1.0))
            .collect();

        // Non-sequence history entries are dropped; survivors are sanitized
        let mut recent_attributions: VecDeque<Vec<f64>> = raw
            .recent_attributions
            .iter()
            .filter_map(|entry| {
                let values = entry.as_array()?;
                Some(
                    values
                        .iter()
                        .map(|v| finite_or(v.as_f64().unwrap_or(0.0), 0.0))
                        .collect(),
                )
            })
            .collect();
        while recent_attributions.len() > HISTORY_WINDOW {
            recent_attributions.pop_front();
        }

        // Each snapshot validated individually; invalid ones are dropped
        let mut signal_history: VecDeque<SignalSnapshot> = raw
            .signal_history
            .iter()
            .filter_map(SignalSnapshot::from_value)
            .collect();
        while signal_history.len() > HISTORY_WINDOW {
            signal_history.pop_front();
        }

        Self {
            fitness,
            meta_rates,
            recent_attributions,
            session_count: raw.session_count,
            signal_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_state_shape() {
        let state = OptimizerState::new(4);
        assert_eq!(state.fitness, vec![0.0; 4]);
        assert_eq!(state.meta_rates, vec![1.0; 4]);
        assert_eq!(state.session_count, 0);
        assert!(state.signal_history.is_empty());
    }

    #[test]
    fn test_resize_preserves_existing_dimensions() {
        let mut state = OptimizerState::new(2);
        state.fitness[1] = 0.7;
        state.meta_rates[0] = 1.5;
        state.resize(4);
        assert_eq!(state.fitness, vec![0.0, 0.7, 0.0, 0.0]);
        assert_eq!(state.meta_rates, vec![1.5, 1.0, 1.0, 1.0]);
        state.resize(1);
        assert_eq!(state.dimension_count(), 1);
    }

    #[test]
    fn test_attribution_window_evicts_oldest() {
        let mut state = OptimizerState::new(1);
        for i in 0..25 {
            state.push_attribution(vec![i as f64]);
        }
        assert_eq!(state.recent_attributions.len(), HISTORY_WINDOW);
        assert_eq!(state.recent_attributions.front().unwrap()[0], 5.0);
    }

    #[test]
    fn test_round_trip() {
        let mut state = OptimizerState::new(3);
        state.fitness = vec![0.1, 0.2, 0.3];
        state.meta_rates = vec![0.9, 1.1, 1.0];
        state.session_count = 7;
        state.push_attribution(vec![0.4, 0.0, -0.2]);

        let text = serde_json::to_string(&state).unwrap();
        let loaded: OptimizerState = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.fitness, state.fitness);
        assert_eq!(loaded.meta_rates, state.meta_rates);
        assert_eq!(loaded.session_count, 7);
        assert_eq!(loaded.recent_attributions, state.recent_attributions);
    }

    #[test]
    fn test_missing_fields_load_as_defaults() {
        let loaded: OptimizerState = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded.dimension_count(), 0);
        assert_eq!(loaded.session_count, 0);
    }

    #[test]
    fn test_corrupt_history_entries_are_dropped() {
        let value = json!({
            "fitness": [0.2, null],
            "meta_rates": [1.2, "bad"],
            "recent_attributions": [[0.1], "corrupt", [0.2]],
            "session_count": 4,
            "signal_history": [
                {
                    "session": 1,
                    "timestamp": 0,
                    "raw_outcome": 0.5,
                    "adjusted_outcome": 0.1,
                    "signals": [0.0]
                },
                {"session": 2}
            ]
        });
        let loaded: OptimizerState = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.fitness, vec![0.2, 0.0]);
        assert_eq!(loaded.meta_rates, vec![1.2, 1.0]);
        assert_eq!(loaded.recent_attributions.len(), 2);
        assert_eq!(loaded.signal_history.len(), 1);
        assert_eq!(loaded.signal_history[0].session, 1);
    }

    #[test]
    fn test_oversized_histories_truncate_on_load() {
        let attributions: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64]).collect();
        let value = json!({
            "fitness": [0.0],
            "meta_rates": [1.0],
            "recent_attributions": attributions,
            "session_count": 30,
            "signal_history": []
        });
        let loaded: OptimizerState = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.recent_attributions.len(), HISTORY_WINDOW);
        // Most recent entries survive
        assert_eq!(loaded.recent_attributions.back().unwrap()[0], 29.0);
    }
}
