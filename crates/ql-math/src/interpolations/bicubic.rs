//! Bicubic spline on a rectangular grid.
//!
//! One natural spline per grid row interpolates along `x`; a query evaluates
//! every row spline at `x` (or its x-derivative) and runs a second natural
//! spline along `y` through the resulting section.

use super::{CubicNaturalSpline, Interpolation1D, Interpolation2D};
use ql_core::{ensure, errors::Result, Real};

/// Bicubic spline with natural end conditions in both directions.
///
/// `z` is row-major: `z[j * nx + i] = f(xs[i], ys[j])`, the same order in
/// which a two-dimensional finite-difference layout stores its values.
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    rows: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Spline through the grid `xs × ys`.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let (nx, ny) = (xs.len(), ys.len());
        ensure!(ny >= 2, "bicubic spline needs at least 2 y nodes, got {ny}");
        ensure!(
            z.len() == nx * ny,
            "grid values ({}) do not match {nx} x {ny} nodes",
            z.len()
        );
        ensure!(
            ys.windows(2).all(|w| w[0] < w[1]),
            "y nodes must be strictly increasing"
        );
        let rows = z
            .chunks(nx)
            .map(|row| CubicNaturalSpline::new(xs, row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            rows,
        })
    }

    fn across_rows<F>(&self, x: Real, f: F) -> Result<CubicNaturalSpline>
    where
        F: Fn(&CubicNaturalSpline, Real) -> Real,
    {
        let section: Vec<Real> = self.rows.iter().map(|s| f(s, x)).collect();
        CubicNaturalSpline::new(&self.ys, &section)
    }

    /// `∂f/∂x`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(x, |s, x| s.derivative(x))?.value(y))
    }

    /// `∂²f/∂x²`.
    pub fn second_derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(x, |s, x| s.second_derivative(x))?.value(y))
    }

    /// `∂f/∂y`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(x, |s, x| s.value(x))?.derivative(y))
    }

    /// `∂²f/∂y²`.
    pub fn second_derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(x, |s, x| s.value(x))?.second_derivative(y))
    }

    /// `∂²f/∂x∂y`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(x, |s, x| s.derivative(x))?.derivative(y))
    }

    /// `f(x, y)`, with construction errors of the section spline surfaced.
    pub fn try_value(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(x, |s, x| s.value(x))?.value(y))
    }
}

impl Interpolation2D for BicubicSpline {
    fn value(&self, x: Real, y: Real) -> Real {
        // the section spline shares the already-validated y nodes
        self.try_value(x, y).unwrap_or(Real::NAN)
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn y_min(&self) -> Real {
        self.ys[0]
    }

    fn y_max(&self) -> Real {
        self.ys[self.ys.len() - 1]
    }
}
