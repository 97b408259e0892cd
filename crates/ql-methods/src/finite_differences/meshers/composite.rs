//! Tensor product of one-dimensional meshers.

use super::{Fdm1dMesher, FdmMesher};
use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_math::Array;
use std::sync::Arc;

/// Grid whose direction `i` is discretised by the `i`-th 1-D mesher.
///
/// Corresponds to `QuantLib::FdmMesherComposite`.
#[derive(Debug, Clone)]
pub struct FdmMesherComposite {
    layout: Arc<FdmLinearOpLayout>,
    meshers: Vec<Fdm1dMesher>,
}

impl FdmMesherComposite {
    /// Combine `meshers`, one per direction.
    pub fn new(meshers: Vec<Fdm1dMesher>) -> Result<Self> {
        ensure!(!meshers.is_empty(), "at least one mesher is required");
        let layout = FdmLinearOpLayout::new(meshers.iter().map(Fdm1dMesher::size).collect());
        Ok(Self {
            layout: Arc::new(layout),
            meshers,
        })
    }

    /// One-dimensional problem.
    pub fn from_1d(mesher: impl Into<Fdm1dMesher>) -> Result<Self> {
        Self::new(vec![mesher.into()])
    }

    /// Two-dimensional problem.
    pub fn from_2d(m1: impl Into<Fdm1dMesher>, m2: impl Into<Fdm1dMesher>) -> Result<Self> {
        Self::new(vec![m1.into(), m2.into()])
    }

    /// The 1-D meshers by direction.
    pub fn meshers(&self) -> &[Fdm1dMesher] {
        &self.meshers
    }
}

impl FdmMesher for FdmMesherComposite {
    fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        &self.layout
    }

    fn dplus(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.meshers[direction].dplus()[iter.coordinates()[direction]]
    }

    fn dminus(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.meshers[direction].dminus()[iter.coordinates()[direction]]
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.meshers[direction].locations()[iter.coordinates()[direction]]
    }

    fn locations(&self, direction: Size) -> Array {
        let x = self.meshers[direction].locations();
        self.layout
            .iter()
            .map(|it| x[it.coordinates()[direction]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Predefined1dMesher, Uniform1dMesher};

    #[test]
    fn locations_follow_the_layout() {
        let m = FdmMesherComposite::from_2d(
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap(),
            Predefined1dMesher::new(vec![10.0, 20.0]).unwrap(),
        )
        .unwrap();
        assert_eq!(m.layout().dim(), &[3, 2]);
        assert_eq!(m.locations(0).as_slice(), &[0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(m.locations(1).as_slice(), &[10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
        let it = m.layout().iter().nth(4).unwrap();
        assert_eq!(m.location(&it, 0), 0.5);
        assert_eq!(m.dminus(&it, 1), 10.0);
        assert_eq!(m.dplus(&it, 0), 0.5);
    }
}
