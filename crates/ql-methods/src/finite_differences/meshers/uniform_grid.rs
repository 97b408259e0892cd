//! Uniform grid on a box.

use super::FdmMesher;
use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_math::Array;
use std::sync::Arc;

/// Equidistant points in every direction of `layout`, spanning
/// `boundaries[i] = (min, max)`.
///
/// Corresponds to `QuantLib::UniformGridMesher`.
#[derive(Debug, Clone)]
pub struct UniformGridMesher {
    layout: Arc<FdmLinearOpLayout>,
    dx: Vec<Real>,
    locations: Vec<Vec<Real>>,
}

impl UniformGridMesher {
    /// Grid over the box given by `boundaries`.
    pub fn new(layout: Arc<FdmLinearOpLayout>, boundaries: &[(Real, Real)]) -> Result<Self> {
        ensure!(
            boundaries.len() == layout.dim().len(),
            "{} boundaries given for a {}-dimensional layout",
            boundaries.len(),
            layout.dim().len()
        );
        let mut dx = Vec::with_capacity(boundaries.len());
        let mut locations = Vec::with_capacity(boundaries.len());
        for (&n, &(lo, hi)) in layout.dim().iter().zip(boundaries) {
            ensure!(n >= 2, "every direction needs at least two points");
            ensure!(hi > lo, "empty interval [{lo}, {hi}]");
            let h = (hi - lo) / (n - 1) as Real;
            dx.push(h);
            locations.push((0..n).map(|j| lo + j as Real * h).collect());
        }
        Ok(Self {
            layout,
            dx,
            locations,
        })
    }
}

impl FdmMesher for UniformGridMesher {
    fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        &self.layout
    }

    fn dplus(&self, _iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.dx[direction]
    }

    fn dminus(&self, _iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.dx[direction]
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.locations[direction][iter.coordinates()[direction]]
    }

    fn locations(&self, direction: Size) -> Array {
        self.layout
            .iter()
            .map(|it| self.location(&it, direction))
            .collect()
    }
}
