//! # quantlib-fdm
//!
//! Finite-difference pricing of equity derivatives in the style of
//! [QuantLib](https://www.quantlib.org/).
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `ql-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use quantlib_fdm::instruments::{
//!     Exercise, OptionType, PlainVanillaPayoff, PricingEngine, VanillaOptionArguments,
//! };
//! use quantlib_fdm::pricingengines::{FdBlackScholesVanillaEngine, FdGridSettings};
//! use quantlib_fdm::processes::black_scholes_merton_process;
//! use quantlib_fdm::termstructures::{BlackConstantVol, FlatForward};
//! use std::sync::Arc;
//!
//! let process = Arc::new(black_scholes_merton_process(
//!     100.0,
//!     Arc::new(FlatForward::new(0.05)),
//!     Arc::new(FlatForward::new(0.0)),
//!     Arc::new(BlackConstantVol::new(0.2)),
//! ));
//! let put = VanillaOptionArguments::new(
//!     Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
//!     Exercise::american(0.0, 1.0)?,
//! );
//! let engine = FdBlackScholesVanillaEngine::new(process)
//!     .with_grid(FdGridSettings::default().with_x_grid(200));
//! let results = engine.calculate(&put)?;
//! assert!(results.npv > 5.5 && results.npv < 6.5);
//! # Ok::<(), quantlib_fdm::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Arrays, matrices, interpolation, integration and matrix utilities.
pub use ql_math as math;

/// Yield and volatility term structures.
pub use ql_termstructures as termstructures;

/// Black-Scholes and Heston processes.
pub use ql_processes as processes;

/// Payoffs, exercises and instrument arguments.
pub use ql_instruments as instruments;

/// Meshers, operators, boundary and step conditions, schemes and solvers.
pub use ql_methods as methods;

/// Finite-difference and reference pricing engines.
pub use ql_pricingengines as pricingengines;
