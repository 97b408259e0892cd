use super::{check_times, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use std::sync::Arc;

/// Early exercise on a fixed set of times only.
///
/// Corresponds to `QuantLib::FdmBermudanStepCondition`.
#[derive(Debug, Clone)]
pub struct FdmBermudanStepCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmBermudanStepCondition {
    /// Exercise at each of the strictly increasing `exercise_times`.
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<dyn FdmMesher>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Result<Self> {
        check_times(&exercise_times)?;
        Ok(Self {
            exercise_times,
            mesher,
            calculator,
        })
    }

    /// Exercise times in increasing order.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmBermudanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !self.exercise_times.contains(&t) {
            return Ok(());
        }
        for iter in self.mesher.layout().iter() {
            let inner = self.calculator.inner_value(&iter, t);
            let i = iter.index();
            if inner > a[i] {
                a[i] = inner;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::put_setup;
    use super::*;

    #[test]
    fn exercises_only_on_exercise_times() {
        let (mesher, calc) = put_setup();
        let condition = FdmBermudanStepCondition::new(vec![0.5, 1.0], mesher.clone(), calc).unwrap();
        let n = mesher.layout().size();

        let mut a = Array::zeros(n);
        condition.apply_to(&mut a, 0.75).unwrap();
        assert!(a.iter().all(|&v| v == 0.0));

        condition.apply_to(&mut a, 0.5).unwrap();
        assert!(a[0] > 49.0);
        assert_eq!(a[n - 1], 0.0);
    }

    #[test]
    fn rejects_unsorted_times() {
        let (mesher, calc) = put_setup();
        assert!(FdmBermudanStepCondition::new(vec![1.0, 0.5], mesher, calc).is_err());
    }
}
