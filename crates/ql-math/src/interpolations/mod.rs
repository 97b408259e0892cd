//! Interpolation in one and two dimensions.
//!
//! The finite-difference solvers read prices and greeks off the final grid
//! through these interpolations, so besides values they expose first and
//! second derivatives. Outside the node range every scheme extrapolates its
//! boundary segment.

pub mod bicubic;
pub mod bilinear;
pub mod cubic;

pub use bicubic::BicubicSpline;
pub use bilinear::BilinearInterpolation;
pub use cubic::CubicNaturalSpline;

use ql_core::{ensure, errors::Result, Real};

/// A function `f: ℝ → ℝ` through a set of nodes.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// `f(x)`.
    fn value(&self, x: Real) -> Real;

    /// `f'(x)`.
    fn derivative(&self, x: Real) -> Real;

    /// `f''(x)`.
    fn second_derivative(&self, x: Real) -> Real;

    /// First node.
    fn x_min(&self) -> Real;

    /// Last node.
    fn x_max(&self) -> Real;

    /// `true` if `x` lies within `[x_min, x_max]`.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// A function `f: ℝ² → ℝ` on a rectangular grid.
pub trait Interpolation2D: std::fmt::Debug + Send + Sync {
    /// `f(x, y)`.
    fn value(&self, x: Real, y: Real) -> Real;

    /// Smallest x node.
    fn x_min(&self) -> Real;

    /// Largest x node.
    fn x_max(&self) -> Real;

    /// Smallest y node.
    fn y_min(&self) -> Real;

    /// Largest y node.
    fn y_max(&self) -> Real;

    /// `true` if `(x, y)` lies inside the grid.
    fn is_in_range(&self, x: Real, y: Real) -> bool {
        x >= self.x_min() && x <= self.x_max() && y >= self.y_min() && y <= self.y_max()
    }
}

/// Index `i` of the segment `[xs[i], xs[i+1]]` used for `x`, clamped to the
/// first and last segment.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // first node strictly greater than x
    xs.partition_point(|&xi| xi <= x) - 1
}

/// Common checks on node arrays.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ensure!(
        xs.len() >= min_points,
        "not enough points to interpolate: at least {min_points} required, {} provided",
        xs.len()
    );
    ensure!(
        xs.len() == ys.len(),
        "node count mismatch: {} abscissas, {} ordinates",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[0] < w[1]),
        "abscissas must be strictly increasing"
    );
    Ok(())
}

/// Piecewise-linear interpolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Interpolation through `(xs[i], ys[i])`; `xs` strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    fn slope(&self, i: usize) -> Real {
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolation1D for LinearInterpolation {
    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.slope(i)
    }

    fn derivative(&self, x: Real) -> Real {
        self.slope(locate(&self.xs, x))
    }

    fn second_derivative(&self, _x: Real) -> Real {
        0.0
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_interpolation_and_extrapolation() {
        let f = LinearInterpolation::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert_abs_diff_eq!(f.value(0.5), 0.5);
        assert_abs_diff_eq!(f.value(1.5), 2.5);
        assert_abs_diff_eq!(f.value(3.0), 7.0);
        assert_abs_diff_eq!(f.value(-1.0), -1.0);
        assert_abs_diff_eq!(f.derivative(1.2), 3.0);
        assert!(f.is_in_range(2.0));
        assert!(!f.is_in_range(2.1));
    }

    #[test]
    fn locate_picks_segment() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(locate(&xs, -5.0), 0);
        assert_eq!(locate(&xs, 0.0), 0);
        assert_eq!(locate(&xs, 1.0), 1);
        assert_eq!(locate(&xs, 2.5), 2);
        assert_eq!(locate(&xs, 3.0), 2);
        assert_eq!(locate(&xs, 9.0), 2);
    }

    #[test]
    fn rejects_unsorted_nodes() {
        assert!(LinearInterpolation::new(&[0.0, 0.0], &[1.0, 2.0]).is_err());
        assert!(LinearInterpolation::new(&[0.0], &[1.0]).is_err());
        assert!(LinearInterpolation::new(&[0.0, 1.0], &[1.0]).is_err());
    }
}
