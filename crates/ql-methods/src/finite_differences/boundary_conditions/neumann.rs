//! Zero-gradient boundaries.

use super::{BoundaryCondition, Side};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::Size;
use ql_math::Array;

/// Copies the adjacent interior value onto the boundary, so that the
/// one-sided first derivative vanishes there.
#[derive(Debug, Clone)]
pub struct FdmNeumannBoundary {
    pairs: Vec<(Size, Size)>,
}

impl FdmNeumannBoundary {
    /// Zero gradient on `side` of `direction`.
    pub fn new(mesher: &dyn FdmMesher, direction: Size, side: Side) -> Self {
        let layout = mesher.layout();
        let (target, offset) = match side {
            Side::Lower => (0, 1),
            Side::Upper => (layout.dim()[direction] - 1, -1),
        };
        let pairs = layout
            .iter()
            .filter(|it| it.coordinates()[direction] == target)
            .map(|it| (it.index(), layout.neighbourhood(&it, direction, offset)))
            .collect();
        Self { pairs }
    }

    fn copy_inner(&self, a: &mut Array) {
        for &(boundary, inner) in &self.pairs {
            a[boundary] = a[inner];
        }
    }
}

impl BoundaryCondition for FdmNeumannBoundary {
    fn apply_after_applying(&self, a: &mut Array) {
        self.copy_inner(a);
    }

    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, _rhs: &mut Array) {}

    fn apply_after_solving(&self, a: &mut Array) {
        self.copy_inner(a);
    }
}
