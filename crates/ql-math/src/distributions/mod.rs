//! Probability distributions.
//!
//! The standard normal is evaluated through `statrs`' error functions; the
//! non-central chi-squared law is a Poisson mixture of central chi-squared
//! laws, also built on `statrs`.

pub mod non_central_chi_squared;
pub mod normal;

pub use non_central_chi_squared::NonCentralChiSquared;
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
