//! # ql-processes
//!
//! Stochastic processes driving the finite-difference engines: the
//! generalized Black-Scholes process, the Heston stochastic-volatility
//! process and the Hull-White short-rate process.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes_process;
pub mod heston_process;
pub mod hull_white_process;
pub mod stochastic_process;

pub use black_scholes_process::{
    black_scholes_merton_process, black_scholes_process, GeneralizedBlackScholesProcess,
};
pub use heston_process::HestonProcess;
pub use hull_white_process::HullWhiteProcess;
pub use stochastic_process::StochasticProcess1D;
