//! Shared data types consumed across the Anima engine

pub mod attribution;
pub mod tool_call;

pub use attribution::{densify, Attribution};
pub use tool_call::ToolCall;
