//! Exercise values on the grid.
//!
//! A calculator maps a grid point to the payoff received when exercising
//! there. Initial values at maturity use the cell average instead of the
//! point value, which removes most of the error caused by the payoff kink
//! falling between two nodes.

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpIterator;
use ql_core::{Real, Size, Time};
use ql_instruments::Payoff;
use ql_math::integrals::{Integrator, SimpsonIntegral};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Exercise value at a grid point.
pub trait FdmInnerValueCalculator: fmt::Debug + Send + Sync {
    /// Payoff at the point itself.
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;

    /// Payoff averaged over the cell around the point.
    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;
}

/// Payoff of `exp(x)` where `x` is the log-spot coordinate along
/// `direction`.
///
/// Corresponds to `QuantLib::FdmLogInnerValue`.
#[derive(Debug)]
pub struct FdmLogInnerValue<P: ?Sized = dyn Payoff> {
    payoff: Arc<P>,
    mesher: Arc<dyn FdmMesher>,
    direction: Size,
    avg_inner_values: OnceLock<Vec<Real>>,
}

impl<P: Payoff + ?Sized> FdmLogInnerValue<P> {
    /// Calculator for `payoff` on the log-spot direction of `mesher`.
    pub fn new(payoff: Arc<P>, mesher: Arc<dyn FdmMesher>, direction: Size) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            avg_inner_values: OnceLock::new(),
        }
    }

    fn cell_average(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let dim = self.mesher.layout().dim()[self.direction];
        let coord = iter.coordinates()[self.direction];
        if coord == 0 || coord == dim - 1 {
            return self.inner_value(iter, t);
        }
        let loc = self.mesher.location(iter, self.direction);
        let a = loc - 0.5 * self.mesher.dminus(iter, self.direction);
        let b = loc + 0.5 * self.mesher.dplus(iter, self.direction);
        let f = |x: Real| self.payoff.value(x.exp());
        let (fa, fb) = (f(a), f(b));
        let acc = if fa != 0.0 || fb != 0.0 {
            ((fa + fb) * 5e-5).abs()
        } else {
            1e-4
        };
        SimpsonIntegral::new(acc, 8)
            .integrate(f, a, b)
            .map_or_else(|_| self.inner_value(iter, t), |v| v / (b - a))
    }
}

impl<P: Payoff + ?Sized> FdmInnerValueCalculator for FdmLogInnerValue<P> {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        let s = self.mesher.location(iter, self.direction).exp();
        self.payoff.value(s)
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let values = self.avg_inner_values.get_or_init(|| {
            let dim = self.mesher.layout().dim()[self.direction];
            let mut values = vec![0.0; dim];
            let mut initialized = vec![false; dim];
            for it in self.mesher.layout().iter() {
                let xn = it.coordinates()[self.direction];
                if !initialized[xn] {
                    initialized[xn] = true;
                    values[xn] = self.cell_average(&it, t);
                }
            }
            values
        });
        values[iter.coordinates()[self.direction]]
    }
}

/// Zero everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmZeroInnerValue;

impl FdmInnerValueCalculator for FdmZeroInnerValue {
    fn inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }

    fn avg_inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }
}
