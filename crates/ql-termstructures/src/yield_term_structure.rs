//! `YieldTermStructure` — yield / interest-rate term structures.
//!
//! All rates are continuously compounded:
//!
//! * **discount factor** — `P(t)`
//! * **zero rate** — `z(t) = -ln P(t) / t`
//! * **forward rate** — `f(t₁, t₂) = ln(P(t₁) / P(t₂)) / (t₂ - t₁)`

use crate::term_structure::TermStructure;
use ql_core::{DiscountFactor, Rate, Real, Time};

/// Small time step used for instantaneous forward rates.
const DT: Real = 1.0e-4;

/// A yield (interest-rate) term structure.
///
/// Implementors must provide **exactly one** of the low-level hooks
/// [`discount_impl`](YieldTermStructure::discount_impl) or
/// [`zero_rate_impl`](YieldTermStructure::zero_rate_impl); the other is
/// derived.
pub trait YieldTermStructure: TermStructure {
    // ── Low-level impl hooks (override exactly one) ──────────────────────

    /// Discount factor for time `t`.
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate_impl(t) * t).exp()
    }

    /// Continuously-compounded zero rate for time `t`.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        let t = if t == 0.0 { DT } else { t };
        -self.discount_impl(t).ln() / t
    }

    // ── Public interface ─────────────────────────────────────────────────

    /// Discount factor for a time.
    fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_impl(t)
    }

    /// Continuously-compounded zero rate for `[0, t]`.
    fn zero_rate(&self, t: Time) -> Rate {
        self.zero_rate_impl(t)
    }

    /// Continuously-compounded forward rate for `[t1, t2]`.
    ///
    /// With `t1 == t2` the instantaneous forward at `t1` is approximated
    /// over a small step.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        let (t1, t2) = if t2 == t1 {
            let lo = (t1 - DT / 2.0).max(0.0);
            (lo, lo + DT)
        } else {
            (t1, t2)
        };
        (self.discount_impl(t1) / self.discount_impl(t2)).ln() / (t2 - t1)
    }
}
