use super::StepCondition;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpLayout;
use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_instruments::Dividend;
use ql_math::interpolations::{CubicNaturalSpline, Interpolation1D};
use ql_math::Array;
use std::sync::Arc;

/// Discrete cash dividends on a log-spot grid.
///
/// Across a payment the spot drops by the dividend amount while the option
/// value is continuous, so just before payment the value at `S` equals the
/// value just after payment at `S − D`. Each grid line along the equity
/// direction is re-interpolated in spot space; spots falling below the
/// grid are clamped to its lowest point.
///
/// Corresponds to `QuantLib::FdmDividendHandler`.
#[derive(Debug, Clone)]
pub struct FdmDividendHandler {
    dividend_times: Vec<Time>,
    amounts: Vec<Real>,
    x: Vec<Real>,
    layout: Arc<FdmLinearOpLayout>,
    equity_direction: Size,
}

impl FdmDividendHandler {
    /// Handler for the dividends in `dividends`, applied along `equity_direction`.
    pub fn new(
        dividends: &[Dividend],
        mesher: &dyn FdmMesher,
        equity_direction: Size,
    ) -> Result<Self> {
        ensure!(
            dividends.windows(2).all(|w| w[0].time < w[1].time),
            "dividend times must be strictly increasing"
        );
        let layout = mesher.layout().clone();
        ensure!(
            equity_direction < layout.dim().len(),
            "equity direction {equity_direction} out of range"
        );

        let mut x = vec![0.0; layout.dim()[equity_direction]];
        for iter in layout.iter() {
            x[iter.coordinates()[equity_direction]] =
                mesher.location(&iter, equity_direction).exp();
        }

        Ok(Self {
            dividend_times: dividends.iter().map(|d| d.time).collect(),
            amounts: dividends.iter().map(|d| d.amount).collect(),
            x,
            layout,
            equity_direction,
        })
    }

    /// Times of the handled dividends.
    pub fn dividend_times(&self) -> &[Time] {
        &self.dividend_times
    }

    /// Cash amounts, one per dividend time.
    pub fn dividends(&self) -> &[Real] {
        &self.amounts
    }
}

impl StepCondition for FdmDividendHandler {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let Some(k) = self.dividend_times.iter().position(|&d| d == t) else {
            return Ok(());
        };
        let dividend = self.amounts[k];
        let dir = self.equity_direction;
        let stride = self.layout.spacing()[dir];
        let n = self.x.len();

        let mut line = vec![0.0; n];
        for iter in self.layout.iter() {
            if iter.coordinates()[dir] != 0 {
                continue;
            }
            let start = iter.index();
            for (j, v) in line.iter_mut().enumerate() {
                *v = a[start + j * stride];
            }
            let spline = CubicNaturalSpline::new(&self.x, &line)?;
            for (j, &s) in self.x.iter().enumerate() {
                a[start + j * stride] = spline.value((s - dividend).max(self.x[0]));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};
    use approx::assert_abs_diff_eq;

    #[test]
    fn shifts_spot_by_the_dividend() {
        let mesher = FdmMesherComposite::from_2d(
            Uniform1dMesher::new(1.0_f64.ln(), 200.0_f64.ln(), 200).unwrap(),
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap(),
        )
        .unwrap();
        let handler =
            FdmDividendHandler::new(&[Dividend::new(0.5, 4.0)], &mesher, 0).unwrap();
        assert_eq!(handler.dividend_times(), &[0.5]);

        // values linear in spot are reproduced exactly by the spline
        let mut a = Array::from_fn(mesher.layout().size(), |i| {
            let it = mesher.layout().iter().nth(i).unwrap();
            2.0 * mesher.location(&it, 0).exp() + mesher.location(&it, 1)
        });
        let before = a.clone();
        handler.apply_to(&mut a, 0.4).unwrap();
        assert_eq!(a, before);

        handler.apply_to(&mut a, 0.5).unwrap();
        for it in mesher.layout().iter() {
            let s = mesher.location(&it, 0).exp();
            if s > 30.0 {
                let y = mesher.location(&it, 1);
                assert_abs_diff_eq!(a[it.index()], 2.0 * (s - 4.0) + y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rejects_unsorted_dividends() {
        let mesher =
            FdmMesherComposite::from_1d(Uniform1dMesher::new(0.0, 5.0, 10).unwrap()).unwrap();
        let dividends = [Dividend::new(0.5, 1.0), Dividend::new(0.25, 1.0)];
        assert!(FdmDividendHandler::new(&dividends, &mesher, 0).is_err());
    }
}
