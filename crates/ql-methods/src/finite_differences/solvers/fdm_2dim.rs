use super::{FdmSolverDesc, RollbackCore};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, fail, LazyObject, LazyState, Real};
use ql_math::interpolations::BicubicSpline;
use std::cell::RefCell;

/// Solver on a two-dimensional grid with bicubic spline interpolation of
/// the result.
///
/// Corresponds to `QuantLib::Fdm2DimSolver`.
#[derive(Debug)]
pub struct Fdm2DimSolver {
    state: LazyState,
    core: RollbackCore,
    x: Vec<Real>,
    y: Vec<Real>,
    interpolation: RefCell<Option<BicubicSpline>>,
}

impl Fdm2DimSolver {
    /// Solver for a two-dimensional problem.
    pub fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        let layout = desc.mesher.layout().clone();
        ensure!(layout.dim().len() == 2, "two-dimensional mesher required");
        let mut x = vec![0.0; layout.dim()[0]];
        let mut y = vec![0.0; layout.dim()[1]];
        for iter in layout.iter() {
            let c = iter.coordinates();
            if c[1] == 0 {
                x[c[0]] = desc.mesher.location(&iter, 0);
            }
            if c[0] == 0 {
                y[c[1]] = desc.mesher.location(&iter, 1);
            }
        }
        Ok(Self {
            state: LazyState::new(),
            core: RollbackCore::new(desc, scheme_desc, op)?,
            x,
            y,
            interpolation: RefCell::new(None),
        })
    }

    fn with_interpolation<R>(
        &self,
        f: impl FnOnce(&BicubicSpline) -> Result<R>,
    ) -> Result<R> {
        self.calculate()?;
        match self.interpolation.borrow().as_ref() {
            Some(spline) => f(spline),
            None => fail!("solver results not available"),
        }
    }

    /// Value at grid coordinates `(x, y)`.
    pub fn interpolate_at(&self, x: Real, y: Real) -> Result<Real> {
        self.with_interpolation(|s| s.try_value(x, y))
    }

    /// First derivative along direction 0.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        self.with_interpolation(|s| s.derivative_x(x, y))
    }

    /// First derivative along direction 1.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        self.with_interpolation(|s| s.derivative_y(x, y))
    }

    /// Second derivative along direction 0.
    pub fn derivative_xx(&self, x: Real, y: Real) -> Result<Real> {
        self.with_interpolation(|s| s.second_derivative_x(x, y))
    }

    /// Second derivative along direction 1.
    pub fn derivative_yy(&self, x: Real, y: Real) -> Result<Real> {
        self.with_interpolation(|s| s.second_derivative_y(x, y))
    }

    /// Mixed second derivative.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Result<Real> {
        self.with_interpolation(|s| s.derivative_xy(x, y))
    }

    /// `(V(x, y, t_snapshot) − V(x, y, 0)) / t_snapshot`.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Real> {
        let value = self.interpolate_at(x, y)?;
        let (snapshot, t) = self.core.theta_snapshot()?;
        let later = BicubicSpline::new(&self.x, &self.y, snapshot.as_slice())?.try_value(x, y)?;
        Ok((later - value) / t)
    }
}

impl LazyObject for Fdm2DimSolver {
    fn perform_calculations(&self) -> Result<()> {
        let values = self.core.rollback()?;
        *self.interpolation.borrow_mut() =
            Some(BicubicSpline::new(&self.x, &self.y, values.as_slice())?);
        Ok(())
    }

    fn lazy_state(&self) -> &LazyState {
        &self.state
    }
}
