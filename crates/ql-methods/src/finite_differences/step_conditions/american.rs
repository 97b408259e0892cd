use super::StepCondition;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use std::sync::Arc;

/// Early exercise at every step: values are floored at the exercise value.
///
/// Corresponds to `QuantLib::FdmAmericanStepCondition`.
#[derive(Debug, Clone)]
pub struct FdmAmericanStepCondition {
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmAmericanStepCondition {
    /// Creates a new instance.
    pub fn new(mesher: Arc<dyn FdmMesher>, calculator: Arc<dyn FdmInnerValueCalculator>) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
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
    fn floors_at_exercise_value() {
        let (mesher, calc) = put_setup();
        let condition = FdmAmericanStepCondition::new(mesher.clone(), calc);
        let mut a = Array::zeros(mesher.layout().size());
        condition.apply_to(&mut a, 0.3).unwrap();
        let x = mesher.locations(0);
        for i in 0..a.len() {
            assert!((a[i] - (100.0 - x[i].exp()).max(0.0)).abs() < 1e-12);
        }

        let mut high = Array::from_element(a.len(), 60.0);
        condition.apply_to(&mut high, 0.3).unwrap();
        assert!(high.iter().all(|&v| v == 60.0));
    }
}
