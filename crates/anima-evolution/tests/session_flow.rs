//! End-to-end session flow: optimizer and expertise tracker driven together
//! the way the identity layer drives them, one completed session at a time.

use serde_json::json;

use anima_common::{Attribution, ToolCall};
use anima_evolution::{
    verify_conservation, ExpertiseConfig, ExpertiseTracker, Optimizer, OptimizerState,
};

fn session_log() -> Vec<ToolCall> {
    vec![
        ToolCall::new("swap_tokens", json!({"pair": "SOL/USDC", "amount": 25}))
            .with_result(json!({"status": "filled", "slippage": 0.002})),
        ToolCall::new("stake_position", json!({"pool": "main"}))
            .with_result(json!({"apy": 0.041})),
    ]
}

#[test]
fn full_session_updates_weights_and_expertise() {
    let optimizer = Optimizer::default();
    let mut state = OptimizerState::new(4);
    let mut tracker = ExpertiseTracker::default();
    let mut weights = vec![0.5, 0.5, 0.5, 0.5];

    let gradient = [0.1, -0.1, 0.0, 0.0];
    let attributions = [Attribution::new(0, 0.4), Attribution::new(1, -0.2)];
    let hessian = [0.8, 1.2, 1.0, 0.9];

    for session in 1..=12u64 {
        let update = optimizer
            .compute_update(&weights, &gradient, 0.5, 0.8, &attributions, &mut state, 0.05)
            .unwrap();
        assert_eq!(state.session_count, session);
        for d in &update.delta {
            assert!(d.is_finite());
            assert!(d.abs() <= optimizer.config().clip_gradient);
        }

        weights = optimizer.apply_update(&weights, &update);
        for w in &weights {
            assert!((optimizer.config().min_weight..=optimizer.config().max_weight).contains(w));
        }

        tracker.update_with_curvature(&session_log(), 0.8, &hessian, &[]);
    }

    // Twelve winning sessions in DeFi/trading territory
    assert!(tracker.primary_domain().is_some());
    let expertise = tracker.expertise();
    assert!((0.0..=1.0).contains(&expertise));

    // Audit trail holds the most recent window
    assert_eq!(state.signal_history.len(), 12);
    let last = state.signal_history.back().unwrap();
    assert_eq!(last.session, 12);
    assert!(last.explanation.is_some());
}

#[test]
fn state_survives_persistence_between_sessions() {
    let optimizer = Optimizer::default();
    let mut state = OptimizerState::new(3);
    let weights = [0.3, 0.6, 0.2];

    optimizer
        .compute_update(
            &weights,
            &[0.05, 0.0, -0.05],
            0.2,
            0.6,
            &[Attribution::new(2, 0.9)],
            &mut state,
            0.05,
        )
        .unwrap();

    // Persist and reload the way the identity bridge would
    let stored = serde_json::to_string(&state).unwrap();
    let mut reloaded: OptimizerState = serde_json::from_str(&stored).unwrap();
    assert_eq!(reloaded.fitness, state.fitness);
    assert_eq!(reloaded.meta_rates, state.meta_rates);
    assert_eq!(reloaded.session_count, 1);
    assert_eq!(reloaded.signal_history.len(), 1);

    // The reloaded state keeps evolving without complaint
    optimizer
        .compute_update(
            &weights,
            &[0.05, 0.0, -0.05],
            -0.1,
            0.1,
            &[],
            &mut reloaded,
            0.05,
        )
        .unwrap();
    assert_eq!(reloaded.session_count, 2);
}

#[test]
fn conservation_holds_for_consistent_fitness() {
    let check = verify_conservation(&[0.2, 0.5, 0.3], &[0.1, 0.4, 0.1]);
    assert!(check.conserved);
    assert!(check.sum.abs() <= 1e-10);
}

#[test]
fn dimension_count_change_requires_resize() {
    let optimizer = Optimizer::default();
    let mut state = OptimizerState::new(2);

    // Grown weight vector against stale state: fatal, state untouched
    let err = optimizer
        .compute_update(&[0.5; 3], &[0.0; 3], 0.0, 0.0, &[], &mut state, 0.05)
        .unwrap_err();
    assert!(err.to_string().contains("Length mismatch"));
    assert_eq!(state.session_count, 0);

    state.resize(3);
    optimizer
        .compute_update(&[0.5; 3], &[0.0; 3], 0.0, 0.0, &[], &mut state, 0.05)
        .unwrap();
    assert_eq!(state.session_count, 1);
}

#[test]
fn profile_round_trip_preserves_expertise() {
    let mut tracker = ExpertiseTracker::default();
    for _ in 0..8 {
        tracker.update(&session_log(), 1.0, &["risk_tolerance".to_string()]);
    }
    let primary = tracker.primary_domain().map(String::from);

    let stored = serde_json::to_string(tracker.profile()).unwrap();
    let profile = serde_json::from_str(&stored).unwrap();
    let resumed = ExpertiseTracker::with_profile(profile, ExpertiseConfig::default());

    assert_eq!(resumed.primary_domain().map(String::from), primary);
    assert_eq!(
        resumed.specializations().len(),
        tracker.specializations().len()
    );
}
