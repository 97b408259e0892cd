//! Boundary conditions.
//!
//! The schemes call the hooks of every condition around each explicit
//! application and each implicit solve of the operator. Conditions act on
//! the grid points of one side of one direction.

pub mod dirichlet;
pub mod neumann;

pub use dirichlet::{FdmDirichletBoundary, FdmTimeDepDirichletBoundary};
pub use neumann::FdmNeumannBoundary;

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{Size, Time};
use ql_math::Array;
use std::fmt;

/// Side of a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Smallest coordinate.
    Lower,
    /// Largest coordinate.
    Upper,
}

/// Hooks run by the schemes around operator applications and solves.
pub trait BoundaryCondition: fmt::Debug + Send + Sync {
    /// Prepare time-dependent boundary values for time `t`.
    fn set_time(&mut self, _t: Time) {}

    /// Called before `L` is applied explicitly.
    fn apply_before_applying(&self, _op: &dyn FdmLinearOpComposite) {}

    /// Called on the result of an explicit application.
    fn apply_after_applying(&self, a: &mut Array);

    /// Called on the right-hand side of an implicit solve.
    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, rhs: &mut Array);

    /// Called on the result of an implicit solve.
    fn apply_after_solving(&self, a: &mut Array);
}

/// Ordered collection of boundary conditions.
///
/// Corresponds to `QuantLib::FdmBoundaryConditionSet`.
#[derive(Debug, Default)]
pub struct FdmBoundaryConditionSet {
    conditions: Vec<Box<dyn BoundaryCondition>>,
}

impl FdmBoundaryConditionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition.
    pub fn push(&mut self, condition: impl BoundaryCondition + 'static) {
        self.conditions.push(Box::new(condition));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, condition: impl BoundaryCondition + 'static) -> Self {
        self.push(condition);
        self
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Forward [`BoundaryCondition::set_time`] to every member.
    pub fn set_time(&mut self, t: Time) {
        self.conditions.iter_mut().for_each(|c| c.set_time(t));
    }

    /// Forward [`BoundaryCondition::apply_before_applying`].
    pub fn apply_before_applying(&self, op: &dyn FdmLinearOpComposite) {
        self.conditions.iter().for_each(|c| c.apply_before_applying(op));
    }

    /// Forward [`BoundaryCondition::apply_after_applying`].
    pub fn apply_after_applying(&self, a: &mut Array) {
        self.conditions.iter().for_each(|c| c.apply_after_applying(a));
    }

    /// Forward [`BoundaryCondition::apply_before_solving`].
    pub fn apply_before_solving(&self, op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        self.conditions
            .iter()
            .for_each(|c| c.apply_before_solving(op, rhs));
    }

    /// Forward [`BoundaryCondition::apply_after_solving`].
    pub fn apply_after_solving(&self, a: &mut Array) {
        self.conditions.iter().for_each(|c| c.apply_after_solving(a));
    }
}

/// Flat indices of the grid points on `side` of `direction`.
pub fn indices_on_boundary(mesher: &dyn FdmMesher, direction: Size, side: Side) -> Vec<Size> {
    let layout = mesher.layout();
    let target = match side {
        Side::Lower => 0,
        Side::Upper => layout.dim()[direction] - 1,
    };
    layout
        .iter()
        .filter(|it| it.coordinates()[direction] == target)
        .map(|it| it.index())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{FdmMesherComposite, Uniform1dMesher};

    #[test]
    fn boundary_indices_of_a_two_dimensional_grid() {
        let m = FdmMesherComposite::from_2d(
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap(),
            Uniform1dMesher::new(0.0, 1.0, 4).unwrap(),
        )
        .unwrap();
        assert_eq!(indices_on_boundary(&m, 0, Side::Lower), vec![0, 3, 6, 9]);
        assert_eq!(indices_on_boundary(&m, 0, Side::Upper), vec![2, 5, 8, 11]);
        assert_eq!(indices_on_boundary(&m, 1, Side::Upper), vec![9, 10, 11]);
    }
}
