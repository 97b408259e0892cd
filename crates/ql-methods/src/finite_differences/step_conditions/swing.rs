use super::{check_times, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{errors::Result, Size, Time};
use ql_math::Array;
use std::sync::Arc;

/// Swing exercise decision on a grid whose `swing_direction` counts the
/// rights already used.
///
/// On an exercise time a holder with `n` used rights either keeps the
/// current value or exercises once more, taking the cash flow and moving to
/// `n + 1`. Exercise is forced when the remaining times are just enough to
/// reach `min_exercises`.
///
/// Corresponds to `QuantLib::FdmSimpleSwingCondition`.
#[derive(Debug, Clone)]
pub struct FdmSimpleSwingCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
    swing_direction: Size,
    min_exercises: Size,
}

impl FdmSimpleSwingCondition {
    /// Swing rights exercised at `exercise_times`; the number of rights used so far is the coordinate along `swing_direction`.
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<dyn FdmMesher>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
        swing_direction: Size,
        min_exercises: Size,
    ) -> Result<Self> {
        check_times(&exercise_times)?;
        Ok(Self {
            exercise_times,
            mesher,
            calculator,
            swing_direction,
            min_exercises,
        })
    }

    /// Exercise times in increasing order.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmSimpleSwingCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let Some(pos) = self.exercise_times.iter().position(|&e| e == t) else {
            return Ok(());
        };
        let layout = self.mesher.layout();
        let max_exercises = layout.dim()[self.swing_direction] - 1;
        let remaining = self.exercise_times.len() - pos;

        let mut result = a.clone();
        for iter in layout.iter() {
            let used = iter.coordinates()[self.swing_direction];
            if used >= max_exercises {
                continue;
            }
            let cash_flow = self.calculator.inner_value(&iter, t);
            let plus_one = a[layout.neighbourhood(&iter, self.swing_direction, 1)];
            if a[iter.index()] < plus_one + cash_flow || used + remaining <= self.min_exercises {
                result[iter.index()] = plus_one + cash_flow;
            }
        }
        *a = result;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use crate::finite_differences::utilities::FdmLogInnerValue;
    use ql_instruments::{OptionType, Payoff, VanillaForwardPayoff};

    fn setup(min_exercises: Size) -> (Arc<dyn FdmMesher>, FdmSimpleSwingCondition) {
        let mesher: Arc<dyn FdmMesher> = Arc::new(
            FdmMesherComposite::from_2d(
                Uniform1dMesher::new(90.0_f64.ln(), 110.0_f64.ln(), 3).unwrap(),
                Uniform1dMesher::new(0.0, 2.0, 3).unwrap(),
            )
            .unwrap(),
        );
        let payoff: Arc<dyn Payoff> = Arc::new(VanillaForwardPayoff::new(OptionType::Call, 100.0));
        let calc = Arc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0));
        let condition =
            FdmSimpleSwingCondition::new(vec![0.5, 1.0], mesher.clone(), calc, 1, min_exercises)
                .unwrap();
        (mesher, condition)
    }

    #[test]
    fn exercises_when_profitable() {
        let (mesher, condition) = setup(0);
        let mut a = Array::zeros(mesher.layout().size());
        condition.apply_to(&mut a, 1.0).unwrap();
        // row with both rights used stays untouched
        assert_eq!(&a.as_slice()[6..9], &[0.0, 0.0, 0.0]);
        // spot 110 exercises, spot 90 keeps the zero value
        assert!((a[2] - 10.0).abs() < 1e-9);
        assert_eq!(a[0], 0.0);
        assert_eq!(a[1], 0.0);
    }

    #[test]
    fn forced_exercise_to_reach_minimum() {
        let (mesher, condition) = setup(2);
        let mut a = Array::zeros(mesher.layout().size());
        condition.apply_to(&mut a, 1.0).unwrap();
        // one time left and one right used: exercise is forced at a loss
        assert!((a[3] + 10.0).abs() < 1e-9);
        // no rights used: forcing still leaves the minimum out of reach
        assert!((a[0] + 10.0).abs() < 1e-9);
    }
}
