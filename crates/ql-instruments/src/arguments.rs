//! Argument structs handed to pricing engines.
//!
//! Each struct describes one kind of option completely; engines validate
//! what they support and fail otherwise.

use crate::dividend::Dividend;
use crate::exercise::{Exercise, ExerciseType};
use crate::payoff::StrikedPayoff;
use ql_core::{ensure, errors::Result, Real, Time};
use std::sync::Arc;

fn validate_dividends(dividends: &[Dividend]) -> Result<()> {
    ensure!(
        dividends.windows(2).all(|w| w[0].time <= w[1].time),
        "dividends must be sorted by time"
    );
    ensure!(
        dividends.iter().all(|d| d.time >= 0.0),
        "dividend times must be non-negative"
    );
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Vanilla
// ────────────────────────────────────────────────────────────────────────────

/// A one-asset option with optional discrete cash dividends on the
/// underlying.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
    /// Cash dividends, sorted by time.
    pub dividends: Vec<Dividend>,
}

impl VanillaOptionArguments {
    /// Option without dividends.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            payoff,
            exercise,
            dividends: Vec::new(),
        }
    }

    /// Attach cash dividends.
    pub fn with_dividends(mut self, dividends: Vec<Dividend>) -> Self {
        self.dividends = dividends;
        self
    }

    /// Check the dividend schedule.
    pub fn validate(&self) -> Result<()> {
        validate_dividends(&self.dividends)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Barrier
// ────────────────────────────────────────────────────────────────────────────

/// Barrier type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierType {
    /// Down-and-in: becomes active when price drops below barrier.
    DownIn,
    /// Up-and-in: becomes active when price rises above barrier.
    UpIn,
    /// Down-and-out: expires when price drops below barrier.
    DownOut,
    /// Up-and-out: expires when price rises above barrier.
    UpOut,
}

impl BarrierType {
    /// The knock-out type with the same barrier direction.
    pub fn knock_out(self) -> Self {
        match self {
            BarrierType::DownIn | BarrierType::DownOut => BarrierType::DownOut,
            BarrierType::UpIn | BarrierType::UpOut => BarrierType::UpOut,
        }
    }

    /// `true` for the knock-in types.
    pub fn is_knock_in(self) -> bool {
        matches!(self, BarrierType::DownIn | BarrierType::UpIn)
    }
}

/// A single-barrier option monitored continuously.
#[derive(Debug, Clone)]
pub struct BarrierOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
    /// Barrier type.
    pub barrier_type: BarrierType,
    /// Barrier level.
    pub barrier: Real,
    /// Cash paid when the barrier is hit (knock-out) or at expiry if it
    /// never was (knock-in).
    pub rebate: Real,
    /// Cash dividends, sorted by time.
    pub dividends: Vec<Dividend>,
}

impl BarrierOptionArguments {
    /// Barrier option without dividends.
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
    ) -> Self {
        Self {
            payoff,
            exercise,
            barrier_type,
            barrier,
            rebate,
            dividends: Vec::new(),
        }
    }

    /// Attach cash dividends.
    pub fn with_dividends(mut self, dividends: Vec<Dividend>) -> Self {
        self.dividends = dividends;
        self
    }

    /// `true` if an underlying at `spot` has already crossed the barrier.
    pub fn triggered(&self, spot: Real) -> bool {
        match self.barrier_type {
            BarrierType::DownIn | BarrierType::DownOut => spot < self.barrier,
            BarrierType::UpIn | BarrierType::UpOut => spot > self.barrier,
        }
    }

    /// Check barrier, rebate and dividends.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.barrier > 0.0, "non-positive barrier ({})", self.barrier);
        ensure!(self.rebate >= 0.0, "negative rebate ({})", self.rebate);
        validate_dividends(&self.dividends)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Swing
// ────────────────────────────────────────────────────────────────────────────

/// A swing option: at each exercise time at most one right may be used,
/// and between `min_exercise_rights` and `max_exercise_rights` rights must
/// be used overall.
#[derive(Debug, Clone)]
pub struct SwingOptionArguments {
    /// Payoff of a single exercise.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// Exercise times (Bermudan schedule).
    pub exercise: Exercise,
    /// Minimum number of rights to use.
    pub min_exercise_rights: usize,
    /// Maximum number of rights to use.
    pub max_exercise_rights: usize,
}

impl SwingOptionArguments {
    /// Swing option on the times of `exercise`.
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        min_exercise_rights: usize,
        max_exercise_rights: usize,
    ) -> Self {
        Self {
            payoff,
            exercise,
            min_exercise_rights,
            max_exercise_rights,
        }
    }

    /// The exercise times.
    pub fn exercise_times(&self) -> &[Time] {
        self.exercise.times()
    }

    /// Check the rights against the schedule.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.exercise.exercise_type() == ExerciseType::Bermudan,
            "swing options need a Bermudan exercise schedule"
        );
        ensure!(
            self.min_exercise_rights <= self.max_exercise_rights,
            "minimum exercise rights ({}) exceed maximum ({})",
            self.min_exercise_rights,
            self.max_exercise_rights
        );
        ensure!(
            self.max_exercise_rights <= self.exercise.times().len(),
            "too many exercise rights ({}) for {} exercise times",
            self.max_exercise_rights,
            self.exercise.times().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{OptionType, PlainVanillaPayoff, VanillaForwardPayoff};

    fn put() -> Arc<dyn StrikedPayoff> {
        Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0))
    }

    #[test]
    fn unsorted_dividends_are_rejected() {
        let args = VanillaOptionArguments::new(put(), Exercise::european(1.0).unwrap())
            .with_dividends(vec![Dividend::new(0.5, 1.0), Dividend::new(0.2, 1.0)]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn barrier_trigger_depends_on_direction() {
        let ex = Exercise::european(1.0).unwrap();
        let down = BarrierOptionArguments::new(put(), ex.clone(), BarrierType::DownOut, 90.0, 0.0);
        assert!(down.triggered(89.0));
        assert!(!down.triggered(95.0));
        let up = BarrierOptionArguments::new(put(), ex, BarrierType::UpIn, 110.0, 1.0);
        assert!(up.triggered(111.0));
        assert!(up.barrier_type.is_knock_in());
        assert_eq!(up.barrier_type.knock_out(), BarrierType::UpOut);
        assert!(up.validate().is_ok());
    }

    #[test]
    fn swing_rights_are_checked() {
        let payoff: Arc<dyn StrikedPayoff> = Arc::new(VanillaForwardPayoff::new(OptionType::Call, 30.0));
        let ex = Exercise::bermudan(vec![0.1, 0.2, 0.3]).unwrap();
        assert!(SwingOptionArguments::new(payoff.clone(), ex.clone(), 0, 3).validate().is_ok());
        assert!(SwingOptionArguments::new(payoff.clone(), ex.clone(), 2, 1).validate().is_err());
        assert!(SwingOptionArguments::new(payoff.clone(), ex, 0, 4).validate().is_err());
        let european = Exercise::european(1.0).unwrap();
        assert!(SwingOptionArguments::new(payoff, european, 0, 1).validate().is_err());
    }
}
