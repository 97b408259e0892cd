//! Spatial grids.
//!
//! Every direction of a problem is discretised by a one-dimensional
//! [`Fdm1dMesher`]; [`FdmMesherComposite`] combines them into the
//! tensor-product grid seen by operators and conditions through the
//! [`FdmMesher`] trait.

// ── Modules ───────────────────────────────────────────────────────────────────

pub mod black_scholes_mesher;
pub mod composite;
pub mod concentrating_1d;
pub mod heston_variance_mesher;
pub mod predefined_1d;
pub mod uniform_1d;
pub mod uniform_grid;

pub use black_scholes_mesher::{BlackScholesMesherParams, FdmBlackScholesMesher};
pub use composite::FdmMesherComposite;
pub use concentrating_1d::Concentrating1dMesher;
pub use heston_variance_mesher::FdmHestonVarianceMesher;
pub use predefined_1d::Predefined1dMesher;
pub use uniform_1d::Uniform1dMesher;
pub use uniform_grid::UniformGridMesher;

use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_math::Array;
use std::fmt;
use std::sync::Arc;

/// A tensor-product grid.
///
/// Corresponds to `QuantLib::FdmMesher`.
pub trait FdmMesher: fmt::Debug + Send + Sync {
    /// Index layout of the grid.
    fn layout(&self) -> &Arc<FdmLinearOpLayout>;

    /// Distance to the next point along `direction`.
    fn dplus(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real;

    /// Distance to the previous point along `direction`.
    fn dminus(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real;

    /// Coordinate of `iter` along `direction`.
    fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real;

    /// Coordinate along `direction` of every grid point, in layout order.
    fn locations(&self, direction: Size) -> Array;
}

// ── One-dimensional meshers ───────────────────────────────────────────────────

/// Points of a one-dimensional grid with their spacings.
///
/// `dplus[i] = x[i+1] - x[i]` and `dminus[i] = x[i] - x[i-1]`; the spacing
/// missing at either end repeats the inner one.
#[derive(Debug, Clone, PartialEq)]
pub struct Fdm1dMesher {
    locations: Vec<Real>,
    dplus: Vec<Real>,
    dminus: Vec<Real>,
}

impl Fdm1dMesher {
    /// Grid through `locations`, which must be strictly increasing.
    pub fn from_locations(locations: Vec<Real>) -> Result<Self> {
        let n = locations.len();
        ensure!(n >= 2, "a mesher needs at least two points, got {n}");
        ensure!(
            locations.windows(2).all(|w| w[0] < w[1]),
            "mesher locations must be strictly increasing"
        );
        let mut dplus = vec![0.0; n];
        let mut dminus = vec![0.0; n];
        for i in 0..n - 1 {
            dplus[i] = locations[i + 1] - locations[i];
            dminus[i + 1] = dplus[i];
        }
        dminus[0] = dplus[0];
        dplus[n - 1] = dminus[n - 1];
        Ok(Self {
            locations,
            dplus,
            dminus,
        })
    }

    /// Number of points.
    pub fn size(&self) -> Size {
        self.locations.len()
    }

    /// Grid points.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }

    /// Forward spacings.
    pub fn dplus(&self) -> &[Real] {
        &self.dplus
    }

    /// Backward spacings.
    pub fn dminus(&self) -> &[Real] {
        &self.dminus
    }
}

/// Wraps an [`Fdm1dMesher`] in a named constructor type.
macro_rules! mesher_1d_newtype {
    ($name:ident) => {
        impl std::ops::Deref for $name {
            type Target = $crate::finite_differences::meshers::Fdm1dMesher;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$name> for $crate::finite_differences::meshers::Fdm1dMesher {
            fn from(m: $name) -> Self {
                m.0
            }
        }
    };
}
pub(crate) use mesher_1d_newtype;
