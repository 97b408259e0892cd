//! Finite-difference framework.
//!
//! A problem is described by a [`meshers::FdmMesher`] (where the grid
//! points are), a [`operators::FdmLinearOpComposite`] (the spatial part of
//! the PDE, split by direction), a [`boundary_conditions::FdmBoundaryConditionSet`]
//! and a [`step_conditions::FdmStepConditionComposite`] (what happens at
//! stopping times). [`solvers::FdmBackwardSolver`] rolls a value array from
//! maturity back to today with the scheme chosen by a
//! [`schemes::FdmSchemeDesc`].
//!
//! Arrays are indexed by [`operators::FdmLinearOpLayout`]: direction 0
//! varies fastest.

pub mod boundary_conditions;
pub mod meshers;
pub mod operators;
pub mod schemes;
pub mod solvers;
pub mod step_conditions;
pub mod utilities;
