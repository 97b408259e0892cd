//! # ql-math
//!
//! Numerical building blocks for the finite-difference framework:
//! array/matrix newtypes over nalgebra, sparse rows, matrix decompositions
//! and pseudo square roots, interpolation, quadrature, ODE integration,
//! optimisation, root finding and the distributions used by the meshers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Dense vector newtype.
pub mod array;

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// Numerical quadrature.
pub mod integrals;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

/// Dense matrix newtype.
pub mod matrix;

/// Decompositions, pseudo square roots and iterative linear solvers.
pub mod matrix_utilities;

/// Adaptive ODE integration.
pub mod ode;

/// Unconstrained minimisation.
pub mod optimization;

/// 1D root-finding solvers.
pub mod solvers1d;

/// Row-oriented sparse matrix.
pub mod sparse_matrix;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use comparison::{close, close_enough};
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use matrix::Matrix;
pub use sparse_matrix::SparseMatrix;
