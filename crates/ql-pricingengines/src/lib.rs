//! # ql-pricingengines
//!
//! Pricing engines built on the finite-difference framework, plus the
//! closed-form references they are checked against.
//!
//! ## Engines
//!
//! - [`FdBlackScholesVanillaEngine`]: European, American and Bermudan
//!   options with cash dividends and optional local volatility
//! - [`FdBlackScholesBarrierEngine`]: single-barrier options with rebate
//! - [`FdHestonVanillaEngine`] and [`FdHestonBarrierEngine`]: the same
//!   instruments under stochastic volatility
//! - [`FdSimpleBSSwingEngine`]: swing options with minimum and maximum
//!   exercise rights
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton closed form
//! - [`AnalyticHestonEngine`]: semi-analytic Heston (Fourier inversion)

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

pub mod analytic_european_engine;
pub mod analytic_heston_engine;
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use analytic_european_engine::{
    black_scholes_merton, AnalyticEuropeanEngine, BlackScholesGreeks,
};
pub use analytic_heston_engine::{heston_price, AnalyticHestonEngine, HestonParams};
pub use finite_differences::{
    FdBlackScholesBarrierEngine, FdBlackScholesVanillaEngine, FdGridSettings,
    FdHestonBarrierEngine, FdHestonVanillaEngine, FdSimpleBSSwingEngine,
};
