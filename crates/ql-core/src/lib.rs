//! # ql-core
//!
//! Core types, traits, and error definitions for quantlib-fdm.
//!
//! This crate provides the building blocks shared by every other crate in
//! the workspace: numeric type aliases, the error enum with its
//! `ensure!` / `ensure_post!` / `fail!` macros, and the `LazyObject` pattern
//! used by the finite-difference solvers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

/// Design patterns (lazy evaluation).
pub mod patterns;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// Signed integer used for stencil offsets.
pub type Integer = i32;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A probability in [0, 1].
pub type Probability = Real;

/// A time measurement in years.
pub type Time = Real;

/// Machine epsilon for `Real`.
pub const QL_EPSILON: Real = f64::EPSILON;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use patterns::lazy_object::{LazyObject, LazyState};
