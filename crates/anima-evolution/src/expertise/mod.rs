//! Expertise and domain classification
//!
//! Classifies sessions into domains from the action log, accumulates
//! outcome-weighted exposure, and derives discrete tiers plus a continuous
//! curvature-blended expertise score.

pub mod config;
pub mod domains;
pub mod profile;
pub mod tracker;

pub use config::ExpertiseConfig;
pub use domains::{detect_domains, DomainMatch, DomainRule, DOMAIN_RULES};
pub use profile::{DomainExposure, DomainProfile, ExpertiseTier, Specialization};
pub use tracker::ExpertiseTracker;
