use super::{check_times, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_math::Array;
use std::sync::Arc;

/// Early redemption of an express certificate.
///
/// On the `i`-th observation time every grid point whose spot lies above
/// `trigger_levels[i]` is worth `redemptions[i]`.
///
/// Corresponds to the `FdmHestonExpressCondition` of QuantLib's operator
/// tests.
#[derive(Debug, Clone)]
pub struct FdmHestonExpressCondition {
    redemptions: Vec<Real>,
    trigger_levels: Vec<Real>,
    exercise_times: Vec<Time>,
    mesher: Arc<dyn FdmMesher>,
    equity_direction: Size,
}

impl FdmHestonExpressCondition {
    /// Condition with one redemption amount and trigger level per
    /// observation time; the log-spot lives in `equity_direction`.
    pub fn new(
        redemptions: Vec<Real>,
        trigger_levels: Vec<Real>,
        exercise_times: Vec<Time>,
        mesher: Arc<dyn FdmMesher>,
        equity_direction: Size,
    ) -> Result<Self> {
        check_times(&exercise_times)?;
        ensure!(
            redemptions.len() == exercise_times.len() && trigger_levels.len() == exercise_times.len(),
            "{} redemptions and {} trigger levels given for {} observation times",
            redemptions.len(),
            trigger_levels.len(),
            exercise_times.len()
        );
        Ok(Self {
            redemptions,
            trigger_levels,
            exercise_times,
            mesher,
            equity_direction,
        })
    }

    /// Observation times in increasing order.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmHestonExpressCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let Some(k) = self.exercise_times.iter().position(|&x| x == t) else {
            return Ok(());
        };
        for iter in self.mesher.layout().iter() {
            let s = self.mesher.location(&iter, self.equity_direction).exp();
            if s > self.trigger_levels[k] {
                a[iter.index()] = self.redemptions[k];
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
    fn redeems_above_the_trigger_on_observation_times() {
        let (mesher, _) = put_setup();
        let condition = FdmHestonExpressCondition::new(
            vec![108.0, 112.0],
            vec![100.0, 120.0],
            vec![0.333, 0.666],
            mesher.clone(),
            0,
        )
        .unwrap();
        let n = mesher.layout().size();
        let spots = mesher.locations(0).map(Real::exp);

        let mut a = Array::from_element(n, 95.0);
        condition.apply_to(&mut a, 0.5).unwrap();
        assert!(a.iter().all(|&v| v == 95.0));

        condition.apply_to(&mut a, 0.333).unwrap();
        for i in 0..n {
            let expected = if spots[i] > 100.0 { 108.0 } else { 95.0 };
            assert_eq!(a[i], expected, "spot {}", spots[i]);
        }

        let mut b = Array::from_element(n, 95.0);
        condition.apply_to(&mut b, 0.666).unwrap();
        assert!((0..n).all(|i| (b[i] == 112.0) == (spots[i] > 120.0)));
    }

    #[test]
    fn one_level_per_observation() {
        let (mesher, _) = put_setup();
        assert!(FdmHestonExpressCondition::new(
            vec![108.0],
            vec![100.0, 100.0],
            vec![0.333, 0.666],
            mesher.clone(),
            0,
        )
        .is_err());
        assert!(
            FdmHestonExpressCondition::new(vec![108.0; 2], vec![100.0; 2], vec![0.6, 0.3], mesher, 0)
                .is_err()
        );
    }
}
