//! `TermStructure` — base trait for all term structures.

use ql_core::{ensure, errors::Result, Time};

/// Base trait for all term structures.
///
/// Times are year fractions measured from the curve's anchor at `t = 0`.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// The latest time for which the curve can be used.
    fn max_time(&self) -> Time {
        Time::MAX
    }

    /// Whether values beyond [`max_time`](Self::max_time) may be extrapolated.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Fail unless `t` lies in the curve's domain.
    fn check_range(&self, t: Time) -> Result<()> {
        ensure!(t >= 0.0, "negative time ({t}) given");
        ensure!(
            self.allows_extrapolation() || t <= self.max_time(),
            "time ({t}) is past max curve time ({})",
            self.max_time()
        );
        Ok(())
    }
}
