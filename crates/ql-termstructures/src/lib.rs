//! # ql-termstructures
//!
//! Yield curves and volatility surfaces as functions of time.
//!
//! Every curve is anchored at `t = 0`; there are no dates, calendars or
//! day counters. Curves are shared between processes and operators as
//! `Arc<dyn Trait>`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure` — base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure` — discount, zero and forward rates.
pub mod yield_term_structure;

/// `FlatForward` — constant forward-rate yield curve.
pub mod flat_forward;

/// `InterpolatedZeroCurve` — zero rates interpolated linearly in time.
pub mod zero_curve;

/// `BlackVolTermStructure` and `BlackConstantVol`.
pub mod black_vol_term_structure;

/// `BlackVarianceSurface` — Black variance interpolated on a (time, strike) grid.
pub mod black_variance_surface;

/// `LocalVolTermStructure` and `LocalConstantVol`.
pub mod local_vol_term_structure;

/// `LocalVolSurface` — Dupire local volatility from a Black surface.
pub mod local_vol_surface;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_variance_surface::BlackVarianceSurface;
pub use black_vol_term_structure::{BlackConstantVol, BlackVolTermStructure};
pub use flat_forward::FlatForward;
pub use local_vol_surface::LocalVolSurface;
pub use local_vol_term_structure::{LocalConstantVol, LocalVolTermStructure};
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
pub use zero_curve::InterpolatedZeroCurve;
