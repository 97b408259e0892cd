use super::StepCondition;
use ql_core::{errors::Result, fail, Time};
use ql_math::Array;
use std::sync::{Mutex, PoisonError};

/// Records a copy of the values when the solver passes time `t`.
///
/// The solvers use it to keep the values one short step before today,
/// from which theta is taken.
#[derive(Debug)]
pub struct FdmSnapshotCondition {
    t: Time,
    values: Mutex<Option<Array>>,
}

impl FdmSnapshotCondition {
    /// Snapshot taken at time `t`.
    pub fn new(t: Time) -> Self {
        Self {
            t,
            values: Mutex::new(None),
        }
    }

    /// Snapshot time.
    pub fn time(&self) -> Time {
        self.t
    }

    /// The recorded values; fails if the solver never reached `t`.
    pub fn values(&self) -> Result<Array> {
        match &*self.values.lock().unwrap_or_else(PoisonError::into_inner) {
            Some(values) => Ok(values.clone()),
            None => fail!("no snapshot taken at t = {}", self.t),
        }
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if t == self.t {
            *self.values.lock().unwrap_or_else(PoisonError::into_inner) = Some(a.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_at_its_time_only() {
        let snapshot = FdmSnapshotCondition::new(0.1);
        let mut a = Array::from_slice(&[1.0, 2.0, 3.0]);
        snapshot.apply_to(&mut a, 0.2).unwrap();
        assert!(snapshot.values().is_err());

        snapshot.apply_to(&mut a, 0.1).unwrap();
        a[0] = 7.0;
        assert_eq!(snapshot.values().unwrap().as_slice(), &[1.0, 2.0, 3.0]);
    }
}
