//! Bilinear interpolation on a rectangular grid.

use super::{check_nodes, locate, Interpolation2D};
use ql_core::{ensure, errors::Result, Real};

/// Bilinear interpolation; `z[j * nx + i] = f(xs[i], ys[j])`.
#[derive(Debug, Clone)]
pub struct BilinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    z: Vec<Real>,
}

impl BilinearInterpolation {
    /// Interpolation on the grid `xs × ys`.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        check_nodes(xs, xs, 2)?;
        check_nodes(ys, ys, 2)?;
        ensure!(
            z.len() == xs.len() * ys.len(),
            "grid values ({}) do not match {} x {} nodes",
            z.len(),
            xs.len(),
            ys.len()
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            z: z.to_vec(),
        })
    }

    fn z(&self, i: usize, j: usize) -> Real {
        self.z[j * self.xs.len() + i]
    }
}

impl Interpolation2D for BilinearInterpolation {
    fn value(&self, x: Real, y: Real) -> Real {
        let i = locate(&self.xs, x);
        let j = locate(&self.ys, y);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        let u = (y - self.ys[j]) / (self.ys[j + 1] - self.ys[j]);
        (1.0 - t) * (1.0 - u) * self.z(i, j)
            + t * (1.0 - u) * self.z(i + 1, j)
            + (1.0 - t) * u * self.z(i, j + 1)
            + t * u * self.z(i + 1, j + 1)
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
