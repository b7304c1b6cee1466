//! # Anima Common
//!
//! Shared types, errors, and numeric primitives for the Anima identity engine.
//!
//! ## Core Types
//!
//! - [`ToolCall`]: read-only record of one tool invocation in a session
//! - [`Attribution`]: per-dimension credit for a session outcome
//!
//! ## Numeric Safety
//!
//! All numeric input crossing a state boundary goes through [`numeric`]:
//! non-finite values are replaced with documented fallbacks so a single bad
//! measurement never poisons persisted identity state.

pub mod error;
pub mod numeric;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AnimaError, Result};
pub use types::{
    attribution::{densify, Attribution},
    tool_call::ToolCall,
};

/// Anima version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
