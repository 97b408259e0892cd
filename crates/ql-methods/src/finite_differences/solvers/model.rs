use crate::finite_differences::schemes::FdmScheme;
use crate::finite_differences::step_conditions::StepCondition;
use ql_core::{ensure, errors::Result, Real, Size, Time, QL_EPSILON};
use ql_math::Array;

/// Rolls values back in fixed steps, landing exactly on stopping times.
///
/// A step that would jump over stopping times is cut into pieces ending
/// on each of them, and the condition is applied at the end of every
/// piece. The regular step size is restored afterwards.
///
/// Corresponds to `QuantLib::FiniteDifferenceModel`.
#[derive(Debug)]
pub struct FiniteDifferenceModel<S> {
    evolver: S,
    stopping_times: Vec<Time>,
}

impl<S: FdmScheme> FiniteDifferenceModel<S> {
    /// Model stepping with `evolver` and stopping at `stopping_times`.
    pub fn new(evolver: S, mut stopping_times: Vec<Time>) -> Self {
        stopping_times.sort_by(|a, b| a.total_cmp(b));
        stopping_times.dedup();
        Self {
            evolver,
            stopping_times,
        }
    }

    /// The time-stepping scheme.
    pub fn evolver(&self) -> &S {
        &self.evolver
    }

    /// Sorted, de-duplicated stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// Roll `a` back from `from` to `to` in `steps` steps.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        condition: Option<&dyn StepCondition>,
    ) -> Result<()> {
        ensure!(from >= to, "trying to roll back from {from} to {to}");
        ensure!(steps > 0, "at least one time step required");
        let dt = (from - to) / steps as Real;
        self.evolver.set_step(dt);

        if self.stopping_times.last() == Some(&from) {
            if let Some(c) = condition {
                c.apply_to(a, from)?;
            }
        }

        let mut t = from;
        for _ in 0..steps {
            let mut now = t;
            let mut next = t - dt;
            if (to - next).abs() < QL_EPSILON.sqrt() {
                next = to;
            }

            let mut hit = false;
            for &stop in self.stopping_times.iter().rev() {
                if next <= stop && stop < now {
                    hit = true;
                    self.evolver.set_step(now - stop);
                    self.evolver.step(a, now)?;
                    if let Some(c) = condition {
                        c.apply_to(a, stop)?;
                    }
                    now = stop;
                }
            }

            if hit {
                if now > next {
                    self.evolver.set_step(now - next);
                    self.evolver.step(a, now)?;
                    if let Some(c) = condition {
                        c.apply_to(a, next)?;
                    }
                }
                self.evolver.set_step(dt);
            } else {
                self.evolver.step(a, now)?;
                if let Some(c) = condition {
                    c.apply_to(a, next)?;
                }
            }
            t -= dt;
        }
        Ok(())
    }
}
