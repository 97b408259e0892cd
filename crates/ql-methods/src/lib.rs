//! # ql-methods
//!
//! Numerical methods for partial differential equations.
//!
//! The [`finite_differences`] framework discretises a pricing PDE on a
//! tensor-product mesh, assembles the spatial operator from banded stencils
//! and rolls the solution back in time with an operator-splitting scheme.
//!
//! # Modules
//!
//! * [`finite_differences::meshers`]: one-dimensional grids and their
//!   tensor product
//! * [`finite_differences::operators`]: layout, stencils and model operators
//! * [`finite_differences::boundary_conditions`]: Dirichlet and Neumann
//!   boundaries
//! * [`finite_differences::step_conditions`]: early exercise, dividends,
//!   snapshots and swing rights
//! * [`finite_differences::schemes`]: time-stepping schemes
//! * [`finite_differences::solvers`]: rollback drivers and 1-D / 2-D solvers

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite-difference PDE framework.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    meshers::{FdmMesher, FdmMesherComposite},
    operators::{FdmLinearOp, FdmLinearOpComposite, FdmLinearOpLayout},
    schemes::{FdmSchemeDesc, FdmSchemeKind},
    solvers::{FdmBackwardSolver, FdmSolverDesc},
};
