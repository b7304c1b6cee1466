//! # Anima Evolution
//!
//! Online weight-evolution engine for autonomous agent identities.
//!
//! ## Update Formula
//!
//! ```text
//! Δw[i] = clip( E[i] + O[i] + R[i] )
//!
//! E[i] = -α_e · m[i] · ∇energy[i]                  (descend the energy landscape)
//! O[i] =  α_o · m[i] · R_adj · attr[i]             (reinforce credited outcomes)
//! R[i] =  α_r · m[i] · (w[i] + μ) · (f[i] - f̄)     (replicator-mutator dynamics)
//! ```
//!
//! Where:
//! - m[i]: adaptive per-dimension meta-rate (neuroplasticity)
//! - f[i]: fitness, an EMA of the dimension's attributed outcome
//! - μ: mutation floor keeping extinct dimensions revivable
//!
//! A convergence guard keeps the energy term dominant while far from a
//! minimum, so outcome and replicator forces only steer near equilibrium.
//!
//! ## Expertise
//!
//! The [`expertise`] module classifies sessions into domains from the action
//! log, accumulates outcome-weighted exposure, and blends a session-count
//! estimate with a curvature (Hessian-diagonal) estimate into a continuous
//! expertise score.
//!
//! Both cores are synchronous and I/O-free; the caller threads explicit state
//! and applies results once per completed session.

pub mod expertise;
pub mod optimizer;

pub use expertise::{
    DomainExposure, DomainProfile, ExpertiseConfig, ExpertiseTier, ExpertiseTracker,
    Specialization,
};
pub use optimizer::{
    verify_conservation, ConservationCheck, Optimizer, OptimizerConfig, OptimizerState,
    SignalSnapshot, WeightUpdate,
};
