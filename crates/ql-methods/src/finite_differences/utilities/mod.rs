//! Helpers shared by conditions and solvers.

pub mod inner_value;

pub use inner_value::{FdmInnerValueCalculator, FdmLogInnerValue, FdmZeroInnerValue};
