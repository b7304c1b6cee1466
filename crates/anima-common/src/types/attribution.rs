//! Attribution - per-dimension credit for a session outcome
//!
//! The attribution model assigns each behavioral dimension a Shapley-style
//! marginal contribution to the session outcome. The pairs are sparse: a
//! dimension absent from the list contributed nothing.

use serde::{Deserialize, Serialize};

use crate::numeric::finite_or;

/// Credit assigned to a single dimension for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Index into the weight vector
    pub index: usize,

    /// Signed credit value; positive means the dimension helped the outcome
    pub value: f64,
}

impl Attribution {
    /// Create an attribution pair
    pub fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }
}

/// Expand sparse attribution pairs into a dense per-dimension vector.
///
/// Out-of-range indices are ignored, non-finite values become zero, and the
/// first pair for an index wins. Densifying once per session replaces the
/// per-dimension list scan with O(1) lookups.
pub fn densify(attributions: &[Attribution], n: usize) -> Vec<f64> {
    let mut dense = vec![0.0; n];
    // Reverse order so the earliest pair for a duplicated index lands last
    for attr in attributions.iter().rev() {
        if attr.index < n {
            dense[attr.index] = finite_or(attr.value, 0.0);
        }
    }
    dense
}
