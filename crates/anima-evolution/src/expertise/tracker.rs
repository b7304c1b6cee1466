//! ExpertiseTracker - session classification and expertise estimation
//!
//! Consumes each session's action log, clamped outcome, and optional
//! Hessian-diagonal curvature. Exposure accumulates with an outcome-derived
//! weight floored at 0.1, so a disastrous session still counts a little and
//! no single session can erase or instantly dominate a domain.
//!
//! The continuous expertise score blends two estimators: a session-frequency
//! estimate and a curvature estimate (sharp landscape = still searching, flat
//! landscape = settled). The blend factor ramps with the number of curvature
//! sessions seen, so the score has no discontinuity the first time curvature
//! data shows up.

use chrono::Utc;
use tracing::{debug, instrument};

use anima_common::numeric::{clamp_finite, mean, sanitize, sigmoid};
use anima_common::ToolCall;

use super::config::ExpertiseConfig;
use super::domains::detect_domains;
use super::profile::{DomainProfile, Specialization};

/// Minimum contribution weight for a session, however bad the outcome
const MIN_SESSION_WEIGHT: f64 = 0.1;

/// Tracks domain exposure and expertise for one identity
#[derive(Debug, Clone)]
pub struct ExpertiseTracker {
    config: ExpertiseConfig,
    profile: DomainProfile,
    /// Sessions that carried curvature data; resets only on construction
    curvature_sessions: u64,
    /// Most recent curvature-derived expertise value
    curvature_expertise: f64,
}

impl Default for ExpertiseTracker {
    fn default() -> Self {
        Self::new(ExpertiseConfig::default())
    }
}

impl ExpertiseTracker {
    /// Create a tracker with an empty profile
    pub fn new(config: ExpertiseConfig) -> Self {
        Self {
            config,
            profile: DomainProfile::default(),
            curvature_sessions: 0,
            curvature_expertise: 0.0,
        }
    }

    /// Resume from a persisted profile; derived pieces are recomputed, and
    /// the curvature counters start over
    pub fn with_profile(mut profile: DomainProfile, config: ExpertiseConfig) -> Self {
        profile.recompute(&config);
        Self {
            config,
            profile,
            curvature_sessions: 0,
            curvature_expertise: 0.0,
        }
    }

    /// Access the active configuration
    pub fn config(&self) -> &ExpertiseConfig {
        &self.config
    }

    /// Current domain profile
    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    /// Take the profile out for persistence
    pub fn into_profile(self) -> DomainProfile {
        self.profile
    }

    /// Domain with the strictly greatest weighted exposure, if any
    pub fn primary_domain(&self) -> Option<&str> {
        self.profile.primary_domain.as_deref()
    }

    /// Current tier specializations, in first-seen order
    pub fn specializations(&self) -> &[Specialization] {
        &self.profile.specializations
    }

    /// Record a completed session.
    ///
    /// The outcome is clamped to [-1, 1] (non-finite counts as 0) and mapped
    /// to a contribution weight `max(0.1, (R+1)/2)`. Every matching domain is
    /// updated independently; insight dimensions are credited to each without
    /// deduplication.
    #[instrument(skip_all, fields(calls = action_log.len()))]
    pub fn update(&mut self, action_log: &[ToolCall], outcome: f64, insight_dimensions: &[String]) {
        let outcome = clamp_finite(outcome, -1.0, 1.0, 0.0);
        let weight = ((outcome + 1.0) / 2.0).max(MIN_SESSION_WEIGHT);
        let now = Utc::now().timestamp_millis();
        let cap = self.config.tool_pattern_cap;

        for detection in detect_domains(action_log) {
            let exposure = self
                .profile
                .exposures
                .entry(detection.domain.to_string())
                .or_insert_with(|| super::profile::DomainExposure::new(now));
            exposure.weighted_sessions += weight;
            exposure.raw_sessions += 1;
            exposure.last_seen = now;
            for tool in &detection.matched_tools {
                exposure.merge_tool_pattern(tool, cap);
            }
            for extension in &detection.matched_extensions {
                exposure.merge_file_pattern(extension, cap);
            }
            exposure.insight_count += insight_dimensions.len() as u64;
            debug!(
                domain = detection.domain,
                weight, "domain exposure updated"
            );
        }

        self.profile.recompute(&self.config);
    }

    /// Record a completed session together with energy-landscape curvature.
    ///
    /// An empty curvature vector degrades to a plain [`update`](Self::update).
    pub fn update_with_curvature(
        &mut self,
        action_log: &[ToolCall],
        outcome: f64,
        hessian_diag: &[f64],
        insight_dimensions: &[String],
    ) {
        self.update(action_log, outcome, insight_dimensions);
        if hessian_diag.is_empty() {
            return;
        }
        let kappa = mean(&sanitize(hessian_diag));
        self.curvature_expertise =
            sigmoid(-(kappa - self.config.curvature_midpoint) / self.config.curvature_scale);
        self.curvature_sessions += 1;
        debug!(
            kappa,
            curvature_expertise = self.curvature_expertise,
            "curvature expertise updated"
        );
    }

    /// Continuous expertise estimate in [0, 1].
    ///
    /// Blends the session-frequency estimate with the curvature estimate:
    /// λ ramps from 0 to 1 over the configured number of curvature sessions,
    /// so the estimate starts purely frequency-based and transitions smoothly.
    pub fn expertise(&self) -> f64 {
        let session_estimate = self
            .profile
            .session_expertise(self.config.expert_threshold);
        let window = self.config.curvature_blend_window.max(1);
        let lambda = (self.curvature_sessions as f64 / window as f64).min(1.0);
        lambda * self.curvature_expertise + (1.0 - lambda) * session_estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rust_session() -> Vec<ToolCall> {
        vec![ToolCall::new("cargo_build", json!({"path": "src/lib.rs"}))]
    }

    #[test]
    fn test_outcome_maps_to_contribution_weight() {
        for (outcome, expected) in [(1.0, 1.0), (-1.0, 0.1), (f64::NAN, 0.5), (0.0, 0.5)] {
            let mut tracker = ExpertiseTracker::default();
            tracker.update(&rust_session(), outcome, &[]);
            let exposure = &tracker.profile().exposures["rust_development"];
            assert!(
                (exposure.weighted_sessions - expected).abs() < 1e-12,
                "outcome {} gave weight {}",
                outcome,
                exposure.weighted_sessions
            );
            assert_eq!(exposure.raw_sessions, 1);
        }
    }

    #[test]
    fn test_out_of_range_outcome_is_clamped() {
        let mut tracker = ExpertiseTracker::default();
        tracker.update(&rust_session(), 25.0, &[]);
        let exposure = &tracker.profile().exposures["rust_development"];
        assert!((exposure.weighted_sessions - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exposure_created_lazily_and_grows() {
        let mut tracker = ExpertiseTracker::default();
        assert!(tracker.profile().exposures.is_empty());
        tracker.update(&rust_session(), 1.0, &[]);
        tracker.update(&rust_session(), 1.0, &[]);
        let exposure = &tracker.profile().exposures["rust_development"];
        assert_eq!(exposure.raw_sessions, 2);
        assert_eq!(exposure.tool_patterns, vec!["cargo_build"]);
        assert_eq!(exposure.file_patterns, vec![".rs"]);
        assert_eq!(tracker.primary_domain(), Some("rust_development"));
    }

    #[test]
    fn test_insights_credited_per_domain() {
        let mut tracker = ExpertiseTracker::default();
        let log = vec![
            ToolCall::new("cargo_test", json!({"path": "src/engine_test.rs"})),
        ];
        let insights = vec!["rigor".to_string(), "patience".to_string()];
        tracker.update(&log, 0.5, &insights);
        // Both matched domains get the full, undeduplicated count
        assert_eq!(tracker.profile().exposures["rust_development"].insight_count, 2);
        assert_eq!(tracker.profile().exposures["testing"].insight_count, 2);
    }

    #[test]
    fn test_specializations_appear_at_thresholds() {
        let mut tracker = ExpertiseTracker::default();
        for _ in 0..5 {
            tracker.update(&rust_session(), 1.0, &[]);
        }
        assert_eq!(tracker.specializations().len(), 1);
        assert_eq!(tracker.specializations()[0].domain, "rust_development");
    }

    #[test]
    fn test_expertise_before_any_curvature_is_frequency_based() {
        let mut tracker = ExpertiseTracker::default();
        for _ in 0..15 {
            tracker.update(&rust_session(), 1.0, &[]);
        }
        // 15 weighted sessions over the 30-session expert threshold
        assert!((tracker.expertise() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_curvature_blend_has_no_jump() {
        let mut tracker = ExpertiseTracker::default();
        for _ in 0..15 {
            tracker.update(&rust_session(), 1.0, &[]);
        }
        let before = tracker.expertise();
        // Flat landscape: curvature says settled (high expertise)
        tracker.update_with_curvature(&rust_session(), 1.0, &[0.0, 0.0], &[]);
        let after = tracker.expertise();
        // One curvature session moves the blend by at most 1/window
        let window = tracker.config().curvature_blend_window as f64;
        assert!((after - before).abs() <= 1.0 / window + 0.05);
    }

    #[test]
    fn test_curvature_direction() {
        let mut sharp = ExpertiseTracker::default();
        let mut flat = ExpertiseTracker::default();
        for _ in 0..10 {
            sharp.update_with_curvature(&rust_session(), 0.0, &[50.0, 50.0], &[]);
            flat.update_with_curvature(&rust_session(), 0.0, &[0.0, 0.0], &[]);
        }
        // Fully blended after the window: sharp landscape = low expertise,
        // flat landscape at zero curvature sits at sigmoid(2) ~ 0.88
        assert!(sharp.expertise() < 0.1);
        assert!(flat.expertise() > 0.85);
    }

    #[test]
    fn test_empty_curvature_does_not_advance_blend() {
        let mut tracker = ExpertiseTracker::default();
        tracker.update_with_curvature(&rust_session(), 1.0, &[], &[]);
        assert_eq!(tracker.curvature_sessions, 0);
    }

    #[test]
    fn test_expertise_stays_in_unit_interval() {
        let mut tracker = ExpertiseTracker::default();
        for _ in 0..50 {
            tracker.update_with_curvature(&rust_session(), 1.0, &[-100.0], &[]);
            let e = tracker.expertise();
            assert!((0.0..=1.0).contains(&e));
        }
    }

    #[test]
    fn test_profile_round_trip_through_tracker() {
        let mut tracker = ExpertiseTracker::default();
        for _ in 0..6 {
            tracker.update(&rust_session(), 1.0, &[]);
        }
        let text = serde_json::to_string(tracker.profile()).unwrap();
        let profile: DomainProfile = serde_json::from_str(&text).unwrap();
        let resumed = ExpertiseTracker::with_profile(profile, ExpertiseConfig::default());
        assert_eq!(resumed.primary_domain(), Some("rust_development"));
        assert_eq!(resumed.specializations().len(), 1);
        // Curvature counters reset on construction
        assert_eq!(resumed.curvature_sessions, 0);
    }
}
