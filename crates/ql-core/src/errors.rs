//! Error types for quantlib-fdm.
//!
//! A single `thiserror`-derived enum covers every failure the library
//! reports. The `ensure!`, `ensure_post!` and `fail!` macros are the
//! shorthand used at call sites for precondition checks, postcondition
//! checks and hard failures.

use thiserror::Error;

/// The top-level error type used throughout quantlib-fdm.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// An iterative method did not reach its tolerance.
    #[error("{method} did not converge after {iterations} iterations (error {error:e})")]
    Convergence {
        /// Name of the numerical method.
        method: &'static str,
        /// Iterations performed before giving up.
        iterations: usize,
        /// Residual error when the method stopped.
        error: f64,
    },

    /// A grid or array index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },
}

/// Shorthand `Result` type used throughout quantlib-fdm.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::ensure_post;
/// fn halve(x: f64) -> ql_core::errors::Result<f64> {
///     let result = 0.5 * x;
///     ensure_post!(result.is_finite(), "non-finite result {result}");
///     Ok(result)
/// }
/// assert!(halve(1.0).is_ok());
/// assert!(halve(f64::INFINITY).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::fail;
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("unknown scheme");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
