//! Weight-evolution optimizer
//!
//! Consumes per-session signals from the energy and attribution models and
//! produces a bounded weight delta plus an audit snapshot. State is explicit
//! and caller-owned; the optimizer itself is a configuration holder.

pub mod audit;
pub mod config;
pub mod state;
pub mod update;

pub use audit::SignalSnapshot;
pub use config::{OptimizerConfig, DEFAULT_DECLARATION_THRESHOLD};
pub use state::{OptimizerState, HISTORY_WINDOW};
pub use update::{verify_conservation, ConservationCheck, Optimizer, WeightUpdate};
