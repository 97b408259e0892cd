//! Fixed-value boundaries.

use super::{indices_on_boundary, BoundaryCondition, Side};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{Real, Size, Time};
use ql_math::Array;
use std::fmt;

/// Holds the boundary slice at a constant value.
///
/// Corresponds to `QuantLib::FdmDirichletBoundary`.
#[derive(Debug, Clone)]
pub struct FdmDirichletBoundary {
    indices: Vec<Size>,
    value: Real,
    location: Real,
}

impl FdmDirichletBoundary {
    /// `value` on `side` of `direction`.
    pub fn new(mesher: &dyn FdmMesher, value: Real, direction: Size, side: Side) -> Self {
        let indices = indices_on_boundary(mesher, direction, side);
        let locations = mesher.locations(direction);
        let location = indices.first().map_or(Real::NAN, |&i| locations[i]);
        Self {
            indices,
            value,
            location,
        }
    }

    /// Boundary value.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Coordinate of the boundary along its direction.
    pub fn location(&self) -> Real {
        self.location
    }

    fn overwrite(&self, a: &mut Array) {
        for &i in &self.indices {
            a[i] = self.value;
        }
    }
}

impl BoundaryCondition for FdmDirichletBoundary {
    fn apply_after_applying(&self, a: &mut Array) {
        self.overwrite(a);
    }

    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        self.overwrite(rhs);
    }

    fn apply_after_solving(&self, a: &mut Array) {
        self.overwrite(a);
    }
}

/// Boundary value as a function of time.
pub type BoundaryValueFn = Box<dyn Fn(Time) -> Real + Send + Sync>;

/// Dirichlet boundary whose value is re-evaluated at every step.
///
/// Corresponds to `QuantLib::FdmTimeDepDirichletBoundary`.
pub struct FdmTimeDepDirichletBoundary {
    indices: Vec<Size>,
    value_on_boundary: BoundaryValueFn,
    value: Real,
}

impl fmt::Debug for FdmTimeDepDirichletBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmTimeDepDirichletBoundary")
            .field("indices", &self.indices.len())
            .field("value", &self.value)
            .finish()
    }
}

impl FdmTimeDepDirichletBoundary {
    /// `value_on_boundary(t)` on `side` of `direction`.
    pub fn new(
        mesher: &dyn FdmMesher,
        value_on_boundary: impl Fn(Time) -> Real + Send + Sync + 'static,
        direction: Size,
        side: Side,
    ) -> Self {
        Self {
            indices: indices_on_boundary(mesher, direction, side),
            value_on_boundary: Box::new(value_on_boundary),
            value: Real::NAN,
        }
    }

    fn overwrite(&self, a: &mut Array) {
        for &i in &self.indices {
            a[i] = self.value;
        }
    }
}

impl BoundaryCondition for FdmTimeDepDirichletBoundary {
    fn set_time(&mut self, t: Time) {
        self.value = (self.value_on_boundary)(t);
    }

    fn apply_after_applying(&self, a: &mut Array) {
        self.overwrite(a);
    }

    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        self.overwrite(rhs);
    }

    fn apply_after_solving(&self, a: &mut Array) {
        self.overwrite(a);
    }
}
