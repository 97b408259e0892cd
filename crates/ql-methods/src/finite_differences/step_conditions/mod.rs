//! Conditions applied to the value array between time steps.
//!
//! Early exercise, discrete dividends, express redemptions, swing rights and
//! snapshots all work the same way: the backward solver lands exactly on the condition's
//! stopping times and calls [`StepCondition::apply_to`] with the values
//! there.

// ── Modules ───────────────────────────────────────────────────────────────────

mod american;
mod bermudan;
mod dividend_handler;
mod express;
mod snapshot;
mod swing;

pub use american::FdmAmericanStepCondition;
pub use bermudan::FdmBermudanStepCondition;
pub use dividend_handler::FdmDividendHandler;
pub use express::FdmHestonExpressCondition;
pub use snapshot::FdmSnapshotCondition;
pub use swing::FdmSimpleSwingCondition;

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{ensure, errors::Result, Size, Time};
use ql_instruments::{Dividend, Exercise, ExerciseType};
use ql_math::Array;
use std::fmt;
use std::sync::Arc;

// ── Step conditions ───────────────────────────────────────────────────────────

/// A modification of the values at a given time.
pub trait StepCondition: fmt::Debug + Send + Sync {
    /// Modify `a`, the values at time `t`, in place.
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()>;
}

/// Several conditions applied in order, with the union of their stopping
/// times.
///
/// Corresponds to `QuantLib::FdmStepConditionComposite`.
#[derive(Debug, Clone, Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Arc<dyn StepCondition>>,
}

impl FdmStepConditionComposite {
    /// Composite of `conditions`; `stopping_times` are sorted and
    /// de-duplicated.
    pub fn new(
        mut stopping_times: Vec<Time>,
        conditions: Vec<Arc<dyn StepCondition>>,
    ) -> Self {
        stopping_times.sort_by(|a, b| a.total_cmp(b));
        stopping_times.dedup();
        Self {
            stopping_times,
            conditions,
        }
    }

    /// Sorted, distinct times the solver must land on.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The conditions in application order.
    pub fn conditions(&self) -> &[Arc<dyn StepCondition>] {
        &self.conditions
    }

    /// `composite` followed by a snapshot at the snapshot's time.
    pub fn join_conditions(
        snapshot: Arc<FdmSnapshotCondition>,
        composite: Arc<FdmStepConditionComposite>,
    ) -> Self {
        let mut times = composite.stopping_times.clone();
        times.push(snapshot.time());
        Self::new(times, vec![composite as Arc<dyn StepCondition>, snapshot])
    }

    /// Conditions of a vanilla equity option: a dividend handler for
    /// dividends paid before expiry, then the early exercise rule.
    pub fn vanilla_composite(
        dividends: &[Dividend],
        exercise: &Exercise,
        mesher: &Arc<dyn FdmMesher>,
        calculator: &Arc<dyn FdmInnerValueCalculator>,
        equity_direction: Size,
    ) -> Result<Self> {
        let maturity = exercise.last_time();
        let mut times = Vec::new();
        let mut conditions: Vec<Arc<dyn StepCondition>> = Vec::new();

        let paid: Vec<Dividend> = dividends
            .iter()
            .filter(|d| d.time > 0.0 && d.time <= maturity)
            .cloned()
            .collect();
        if !paid.is_empty() {
            let handler = FdmDividendHandler::new(&paid, mesher.as_ref(), equity_direction)?;
            times.extend_from_slice(handler.dividend_times());
            conditions.push(Arc::new(handler));
        }

        match exercise.exercise_type() {
            ExerciseType::European => {}
            ExerciseType::American => {
                conditions.push(Arc::new(FdmAmericanStepCondition::new(
                    mesher.clone(),
                    calculator.clone(),
                )));
            }
            ExerciseType::Bermudan => {
                let bermudan = FdmBermudanStepCondition::new(
                    exercise.times().to_vec(),
                    mesher.clone(),
                    calculator.clone(),
                )?;
                times.extend_from_slice(bermudan.exercise_times());
                conditions.push(Arc::new(bermudan));
            }
        }
        Ok(Self::new(times, conditions))
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        for condition in &self.conditions {
            condition.apply_to(a, t)?;
        }
        Ok(())
    }
}

/// Shared check for conditions tied to a sorted list of times.
fn check_times(times: &[Time]) -> Result<()> {
    ensure!(!times.is_empty(), "no condition times given");
    ensure!(
        times.windows(2).all(|w| w[0] < w[1]),
        "condition times must be strictly increasing"
    );
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::finite_differences::meshers::{FdmMesher, FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
    use ql_instruments::{OptionType, Payoff, PlainVanillaPayoff};
    use std::sync::Arc;

    /// Log-spot grid around 100 with a put payoff struck at 100.
    pub(crate) fn put_setup() -> (Arc<dyn FdmMesher>, Arc<dyn FdmInnerValueCalculator>) {
        let mesher: Arc<dyn FdmMesher> = Arc::new(
            FdmMesherComposite::from_1d(
                Uniform1dMesher::new(50.0_f64.ln(), 200.0_f64.ln(), 21).unwrap(),
            )
            .unwrap(),
        );
        let payoff: Arc<dyn Payoff> = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let calculator: Arc<dyn FdmInnerValueCalculator> =
            Arc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0));
        (mesher, calculator)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::put_setup;
    use super::*;

    #[test]
    fn stopping_times_are_merged() {
        let snapshot = Arc::new(FdmSnapshotCondition::new(0.5));
        let inner = Arc::new(FdmStepConditionComposite::new(
            vec![1.0, 0.25, 0.5, 0.25],
            Vec::new(),
        ));
        assert_eq!(inner.stopping_times(), &[0.25, 0.5, 1.0]);
        let joined = FdmStepConditionComposite::join_conditions(snapshot.clone(), inner);
        assert_eq!(joined.stopping_times(), &[0.25, 0.5, 1.0]);
        assert_eq!(joined.conditions().len(), 2);

        let mut a = Array::from_slice(&[1.0, 2.0]);
        joined.apply_to(&mut a, 0.5).unwrap();
        assert_eq!(snapshot.values().unwrap(), a);
    }

    #[test]
    fn vanilla_composite_by_exercise_type() {
        let (mesher, calc) = put_setup();
        let european = FdmStepConditionComposite::vanilla_composite(
            &[],
            &Exercise::european(1.0).unwrap(),
            &mesher,
            &calc,
            0,
        )
        .unwrap();
        assert!(european.conditions().is_empty());
        assert!(european.stopping_times().is_empty());

        let dividends = [
            Dividend::new(0.5, 2.0),
            Dividend::new(1.5, 2.0),
        ];
        let american = FdmStepConditionComposite::vanilla_composite(
            &dividends,
            &Exercise::american(0.0, 1.0).unwrap(),
            &mesher,
            &calc,
            0,
        )
        .unwrap();
        assert_eq!(american.conditions().len(), 2);
        assert_eq!(american.stopping_times(), &[0.5]);

        let bermudan = FdmStepConditionComposite::vanilla_composite(
            &[],
            &Exercise::bermudan(vec![0.25, 0.5, 1.0]).unwrap(),
            &mesher,
            &calc,
            0,
        )
        .unwrap();
        assert_eq!(bermudan.stopping_times(), &[0.25, 0.5, 1.0]);
    }
}
