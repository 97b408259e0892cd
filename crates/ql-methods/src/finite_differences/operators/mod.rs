//! Spatial operators.
//!
//! Stencils act on value arrays laid out by [`FdmLinearOpLayout`].
//! [`TripleBandLinearOp`] holds a three-point stencil along one direction
//! and can be inverted in `O(n)`; [`NinePointLinearOp`] holds the
//! cross-derivative stencil of two directions. Model operators such as
//! [`FdmBlackScholesOp`], [`FdmHestonOp`] and [`FdmHestonHullWhiteOp`]
//! assemble them into an [`FdmLinearOpComposite`], the interface the
//! time-stepping schemes see.

// ── Modules ───────────────────────────────────────────────────────────────────

pub mod black_scholes_op;
pub mod first_derivative;
pub mod heston_hull_white_op;
pub mod heston_op;
pub mod hull_white_op;
pub mod layout;
pub mod mixed_derivative;
pub mod nine_point;
pub mod nth_order_derivative;
pub mod second_derivative;
pub mod triple_band;

pub use black_scholes_op::FdmBlackScholesOp;
pub use first_derivative::FirstDerivativeOp;
pub use heston_hull_white_op::FdmHestonHullWhiteOp;
pub use heston_op::FdmHestonOp;
pub use hull_white_op::FdmHullWhiteOp;
pub use layout::{FdmLinearOpIterator, FdmLinearOpLayout, LayoutIter};
pub use mixed_derivative::SecondOrderMixedDerivativeOp;
pub use nine_point::NinePointLinearOp;
pub use nth_order_derivative::NthOrderDerivativeOp;
pub use second_derivative::SecondDerivativeOp;
pub use triple_band::TripleBandLinearOp;

use ql_core::{errors::Result, Real, Size, Time};
use ql_math::{Array, SparseMatrix};
use std::fmt;

// ── Operator traits ───────────────────────────────────────────────────────────

/// A linear map on grid values.
pub trait FdmLinearOp: fmt::Debug + Send + Sync {
    /// `L r`.
    fn apply(&self, r: &Array) -> Array;

    /// Sparse matrix of the map.
    fn to_matrix(&self) -> Result<SparseMatrix>;
}

/// The spatial operator of a PDE, split into one part per direction plus
/// a mixed-derivative remainder.
pub trait FdmLinearOpComposite: FdmLinearOp {
    /// Number of directions.
    fn size(&self) -> Size;

    /// Freeze time-dependent coefficients for the step from `t1` to `t2`.
    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()>;

    /// Cross-derivative part of the operator.
    fn apply_mixed(&self, r: &Array) -> Array;

    /// Part of the operator acting along `direction` only.
    fn apply_direction(&self, direction: Size, r: &Array) -> Array;

    /// Solve `(I + s·L_direction) x = r`; `s` is usually `-θ·Δt`.
    fn solve_splitting(&self, direction: Size, r: &Array, s: Real) -> Result<Array>;

    /// Approximate inverse of `I + s·L` used to precondition iterative
    /// solvers.
    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array>;

    /// Matrices of the directional parts followed by the mixed part.
    fn to_matrix_decomp(&self) -> Result<Vec<SparseMatrix>>;
}

/// Sum of equally sized sparse matrices.
pub(crate) fn sum_matrices(parts: &[SparseMatrix]) -> Result<SparseMatrix> {
    let (rows, cols) = parts
        .first()
        .map_or((0, 0), |m| (m.rows(), m.cols()));
    let mut sum = SparseMatrix::new(rows, cols);
    for m in parts {
        for i in 0..m.rows() {
            for &(j, v) in m.row(i) {
                sum.add(i, j, v)?;
            }
        }
    }
    Ok(sum)
}
