//! Dense linear algebra beyond the basic `Matrix` operations.
//!
//! Decompositions used for covariance and correlation work (Cholesky,
//! Jacobi eigen-decomposition, pseudo square roots) and the BiCGStab solver
//! used by implicit finite-difference schemes.

pub mod bicgstab;
pub mod cholesky;
pub mod covariance;
pub mod pseudo_sqrt;
pub mod symmetric_schur;

pub use bicgstab::{BiCGStab, BiCGStabResult};
pub use cholesky::cholesky_decomposition;
pub use covariance::{get_covariance, CovarianceDecomposition};
pub use pseudo_sqrt::{pseudo_sqrt, rank_reduced_sqrt, SalvagingAlgorithm};
pub use symmetric_schur::SymmetricSchurDecomposition;
