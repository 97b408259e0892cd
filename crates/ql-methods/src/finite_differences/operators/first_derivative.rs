//! First-derivative stencil.

use super::triple_band::{triple_band_newtype, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::Size;

/// `∂/∂x` along one direction: the three-point central formula for
/// non-uniform grids inside, one-sided two-point formulas at the ends.
#[derive(Debug, Clone)]
pub struct FirstDerivativeOp(TripleBandLinearOp);

impl FirstDerivativeOp {
    /// Stencil along `direction` of `mesher`.
    pub fn new(direction: Size, mesher: &dyn FdmMesher) -> Self {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let last = mesher.layout().dim()[direction] - 1;
        for iter in mesher.layout().iter() {
            let i = iter.index();
            let hm = mesher.dminus(&iter, direction);
            let hp = mesher.dplus(&iter, direction);
            let c = iter.coordinates()[direction];
            let (l, d, u) = if c == 0 {
                (0.0, -1.0 / hp, 1.0 / hp)
            } else if c == last {
                (-1.0 / hm, 1.0 / hm, 0.0)
            } else {
                let zeta0 = hm * hp;
                let zetam1 = hm * (hm + hp);
                let zetap1 = hp * (hm + hp);
                (-hp / zetam1, (hp - hm) / zeta0, hm / zetap1)
            };
            op.lower[i] = l;
            op.diag[i] = d;
            op.upper[i] = u;
        }
        Self(op)
    }
}

triple_band_newtype!(FirstDerivativeOp);
