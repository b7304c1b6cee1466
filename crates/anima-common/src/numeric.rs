//! Safe-numeric primitives for state boundaries
//!
//! Every scalar or vector that crosses into persisted identity state passes
//! through one of these helpers, so the arithmetic in the optimizer and the
//! expertise tracker reads as ordinary code while the safety net stays in one
//! place. A non-finite measurement is replaced, never propagated.

/// Sigmoid input clamp; exp() saturates well before this
pub const SIGMOID_INPUT_LIMIT: f64 = 20.0;

/// Return `value` if finite, otherwise `fallback`.
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamp `value` to `[min, max]`, substituting `fallback` first if non-finite.
#[inline]
pub fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    finite_or(value, fallback).clamp(min, max)
}

/// Copy a slice, replacing non-finite entries with zero.
pub fn sanitize(values: &[f64]) -> Vec<f64> {
    values.iter().map(|&v| finite_or(v, 0.0)).collect()
}

/// Arithmetic mean; empty slices yield zero.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; empty slices yield zero.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Euclidean norm.
pub fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|&v| v * v).sum::<f64>().sqrt()
}

/// Logistic sigmoid with the input clamped to avoid exp overflow.
///
/// Infinite inputs saturate through the clamp; only NaN centers to 0.5.
pub fn sigmoid(x: f64) -> f64 {
    let x = if x.is_nan() { 0.0 } else { x };
    let x = x.clamp(-SIGMOID_INPUT_LIMIT, SIGMOID_INPUT_LIMIT);
    1.0 / (1.0 + (-x).exp())
}
