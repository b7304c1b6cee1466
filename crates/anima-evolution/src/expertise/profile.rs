//! Domain exposure profile
//!
//! Exposure records are created lazily on first detection, never deleted,
//! and only ever grow. The derived pieces (primary domain and tier
//! specializations) are always recomputed from exposure data, never trusted
//! from a persisted copy, so a manual edit or migration can't leave them
//! inconsistent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::ExpertiseConfig;

/// Discrete expertise tier derived from weighted session counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseTier {
    Novice,
    Intermediate,
    Expert,
}

impl ExpertiseTier {
    /// Identity dimensions a tier activates for its domain
    pub fn activated_dimensions(&self) -> &'static [&'static str] {
        match self {
            Self::Novice => &["curiosity", "adaptability"],
            Self::Intermediate => &["rigor", "efficiency"],
            Self::Expert => &["autonomy", "risk_tolerance", "mentorship"],
        }
    }

    /// Guidance text surfaced alongside the specialization
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Novice => "Explore broadly and prefer reversible actions while the domain is new.",
            Self::Intermediate => "Consolidate working patterns and measure before optimizing.",
            Self::Expert => "Act autonomously, take calculated risks, and share what works.",
        }
    }
}

impl fmt::Display for ExpertiseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Novice => "novice",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        };
        write!(f, "{}", name)
    }
}

/// Accumulated exposure to one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainExposure {
    /// Outcome-weighted session count; grows only
    pub weighted_sessions: f64,

    /// Unweighted session count
    pub raw_sessions: u64,

    /// Tool names seen in this domain, FIFO-capped
    #[serde(default)]
    pub tool_patterns: Vec<String>,

    /// File extensions seen in this domain, FIFO-capped
    #[serde(default)]
    pub file_patterns: Vec<String>,

    /// Insight dimensions attached across sessions (not deduplicated)
    #[serde(default)]
    pub insight_count: u64,

    /// Unix milliseconds of first detection
    pub first_seen: i64,

    /// Unix milliseconds of most recent detection
    pub last_seen: i64,
}

impl DomainExposure {
    /// Fresh exposure record at detection time
    pub fn new(now: i64) -> Self {
        Self {
            weighted_sessions: 0.0,
            raw_sessions: 0,
            tool_patterns: Vec::new(),
            file_patterns: Vec::new(),
            insight_count: 0,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Merge a tool name into the capped FIFO set (oldest evicted)
    pub fn merge_tool_pattern(&mut self, name: &str, cap: usize) {
        merge_capped(&mut self.tool_patterns, name, cap);
    }

    /// Merge a file extension into the capped FIFO set (oldest evicted)
    pub fn merge_file_pattern(&mut self, extension: &str, cap: usize) {
        merge_capped(&mut self.file_patterns, extension, cap);
    }
}

fn merge_capped(set: &mut Vec<String>, entry: &str, cap: usize) {
    if set.iter().any(|existing| existing == entry) {
        return;
    }
    set.push(entry.to_string());
    while set.len() > cap {
        set.remove(0);
    }
}

/// A domain that crossed a tier threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    /// Domain name
    pub domain: String,
    /// Reached tier
    pub tier: ExpertiseTier,
    /// Weighted sessions at derivation time
    pub weighted_sessions: f64,
    /// Identity dimensions the tier activates
    pub activated_dimensions: Vec<String>,
    /// Tier guidance text
    pub guidance: String,
}

/// Full domain profile for one identity
///
/// `specializations` is never persisted; it is recomputed from exposures on
/// every load and after every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainProfile {
    /// Exposure records keyed by domain name
    #[serde(default)]
    pub exposures: BTreeMap<String, DomainExposure>,

    /// Domain with the strictly greatest weighted session count
    #[serde(default)]
    pub primary_domain: Option<String>,

    /// Derived tier specializations
    #[serde(skip)]
    pub specializations: Vec<Specialization>,
}

impl DomainProfile {
    /// Recompute the derived pieces from exposure data
    pub fn recompute(&mut self, config: &ExpertiseConfig) {
        self.recompute_primary();
        self.recompute_specializations(config);
    }

    /// Session-count expertise estimate in [0, 1], saturating at the expert
    /// threshold
    pub fn session_expertise(&self, expert_threshold: f64) -> f64 {
        let Some(primary) = self.primary_domain.as_deref() else {
            return 0.0;
        };
        let Some(exposure) = self.exposures.get(primary) else {
            return 0.0;
        };
        if expert_threshold <= 0.0 {
            return 1.0;
        }
        (exposure.weighted_sessions / expert_threshold).min(1.0)
    }

    // Scan in first-seen order with a strict-greater comparison, so a later
    // domain only takes primacy by actually exceeding the incumbent.
    fn recompute_primary(&mut self) {
        let mut best_name: Option<String> = None;
        let mut best_weight = f64::NEG_INFINITY;
        for (name, exposure) in self.first_seen_order() {
            if exposure.weighted_sessions > best_weight {
                best_weight = exposure.weighted_sessions;
                best_name = Some(name.clone());
            }
        }
        self.primary_domain = best_name;
    }

    fn recompute_specializations(&mut self, config: &ExpertiseConfig) {
        let mut specializations = Vec::new();
        for (name, exposure) in self.first_seen_order() {
            let Some(tier) = tier_for(exposure.weighted_sessions, config) else {
                continue;
            };
            specializations.push(Specialization {
                domain: name.clone(),
                tier,
                weighted_sessions: exposure.weighted_sessions,
                activated_dimensions: tier
                    .activated_dimensions()
                    .iter()
                    .map(|d| d.to_string())
                    .collect(),
                guidance: tier.guidance().to_string(),
            });
        }
        self.specializations = specializations;
    }

    fn first_seen_order(&self) -> Vec<(&String, &DomainExposure)> {
        let mut ordered: Vec<_> = self.exposures.iter().collect();
        ordered.sort_by(|a, b| {
            (a.1.first_seen, a.0.as_str()).cmp(&(b.1.first_seen, b.0.as_str()))
        });
        ordered
    }
}

fn tier_for(weighted_sessions: f64, config: &ExpertiseConfig) -> Option<ExpertiseTier> {
    if weighted_sessions >= config.expert_threshold {
        Some(ExpertiseTier::Expert)
    } else if weighted_sessions >= config.intermediate_threshold {
        Some(ExpertiseTier::Intermediate)
    } else if weighted_sessions >= config.novice_threshold {
        Some(ExpertiseTier::Novice)
    } else {
        None
    }
}
