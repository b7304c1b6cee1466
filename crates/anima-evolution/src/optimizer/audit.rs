//! SignalSnapshot - per-session audit record
//!
//! Every call to the optimizer appends one immutable snapshot of what it saw
//! and what it decided. The history is the audit trail the identity layer can
//! replay to explain a weight trajectory; it is capped, so it only ever holds
//! the most recent window.
//!
//! Loading is defensive: a snapshot from an older or corrupted store is
//! validated field by field. Required fields gone bad drop the whole
//! snapshot; optional audit fields gone bad are stripped individually so the
//! rest of the record survives.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Immutable audit record of one optimizer session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSnapshot {
    /// Snapshot id, absent in older schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Session counter value after this update
    pub session: u64,

    /// Unix milliseconds when the update was computed
    pub timestamp: i64,

    /// Raw session outcome fed to the fitness EMA
    pub raw_outcome: f64,

    /// Baseline-adjusted outcome fed to the outcome term
    pub adjusted_outcome: f64,

    /// The clipped per-dimension delta that was returned
    pub signals: Vec<f64>,

    /// Weights before the update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_weights: Option<Vec<f64>>,

    /// Weights after clamped application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_weights: Option<Vec<f64>>,

    /// Energy-descent component (guard-scaled, unclipped)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_term: Option<Vec<f64>>,

    /// Outcome-reinforcement component (guard-scaled, unclipped)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_term: Option<Vec<f64>>,

    /// Replicator-mutator component (guard-scaled, unclipped)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicator_term: Option<Vec<f64>>,

    /// Dense attribution vector for the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributions: Option<Vec<f64>>,

    /// Meta-rates after neuroplasticity adaptation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_rates: Option<Vec<f64>>,

    /// Fitness EMA after this session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness: Option<Vec<f64>>,

    /// Human-readable summary of the dominant movements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl SignalSnapshot {
    /// Rebuild a snapshot from a persisted JSON value.
    ///
    /// Returns `None` when a required field is missing or non-finite, or when
    /// `signals` is not a sequence. Invalid optional fields become `None`
    /// without invalidating the snapshot.
    pub fn from_value(value: &Value) -> Option<Self> {
        let session = value.get("session")?.as_u64()?;
        let timestamp = value.get("timestamp")?.as_i64()?;
        let raw_outcome = required_scalar(value, "raw_outcome")?;
        let adjusted_outcome = required_scalar(value, "adjusted_outcome")?;
        let signals = value
            .get("signals")?
            .as_array()?
            .iter()
            .map(|v| v.as_f64().filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect();

        Some(Self {
            id: value
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok()),
            session,
            timestamp,
            raw_outcome,
            adjusted_outcome,
            signals,
            pre_weights: optional_vector(value, "pre_weights"),
            post_weights: optional_vector(value, "post_weights"),
            energy_term: optional_vector(value, "energy_term"),
            outcome_term: optional_vector(value, "outcome_term"),
            replicator_term: optional_vector(value, "replicator_term"),
            attributions: optional_vector(value, "attributions"),
            meta_rates: optional_vector(value, "meta_rates"),
            fitness: optional_vector(value, "fitness"),
            explanation: value
                .get("explanation")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }
}

/// Required scalar: present and finite, or the snapshot is unusable
fn required_scalar(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_f64().filter(|x| x.is_finite())
}

/// Optional vector: stripped (not fatal) unless every entry is a finite number
fn optional_vector(value: &Value, key: &str) -> Option<Vec<f64>> {
    let entries = value.get(key)?.as_array()?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        out.push(entry.as_f64().filter(|x| x.is_finite())?);
    }
    Some(out)
}
