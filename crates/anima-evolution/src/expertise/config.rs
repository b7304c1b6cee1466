//! Expertise tracker configuration

use serde::{Deserialize, Serialize};

/// Tuning knobs for domain exposure and expertise estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpertiseConfig {
    /// Weighted sessions to reach the novice tier
    pub novice_threshold: f64,
    /// Weighted sessions to reach the intermediate tier
    pub intermediate_threshold: f64,
    /// Weighted sessions to reach the expert tier; also the saturation point
    /// of the session-count expertise estimate
    pub expert_threshold: f64,
    /// FIFO cap on each domain's tool and file pattern sets
    pub tool_pattern_cap: usize,
    /// Mean-curvature value mapping to 0.5 curvature expertise
    pub curvature_midpoint: f64,
    /// Curvature sigmoid steepness divisor
    pub curvature_scale: f64,
    /// Curvature sessions over which the blend reaches fully curvature-based
    pub curvature_blend_window: u64,
}

impl Default for ExpertiseConfig {
    fn default() -> Self {
        Self {
            novice_threshold: 5.0,
            intermediate_threshold: 15.0,
            expert_threshold: 30.0,
            tool_pattern_cap: 20,
            curvature_midpoint: 1.0,
            curvature_scale: 0.5,
            curvature_blend_window: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_are_ordered() {
        let config = ExpertiseConfig::default();
        assert!(config.novice_threshold < config.intermediate_threshold);
        assert!(config.intermediate_threshold < config.expert_threshold);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ExpertiseConfig =
            serde_json::from_str(r#"{"tool_pattern_cap": 8}"#).unwrap();
        assert_eq!(config.tool_pattern_cap, 8);
        assert_eq!(config.expert_threshold, 30.0);
    }
}
