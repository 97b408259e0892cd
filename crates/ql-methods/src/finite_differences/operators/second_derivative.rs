//! Second-derivative stencil.

use super::triple_band::{triple_band_newtype, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::Size;

/// `∂²/∂x²` along one direction. Rows on the grid boundary are zero.
#[derive(Debug, Clone)]
pub struct SecondDerivativeOp(TripleBandLinearOp);

impl SecondDerivativeOp {
    /// Stencil along `direction` of `mesher`.
    pub fn new(direction: Size, mesher: &dyn FdmMesher) -> Self {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let last = mesher.layout().dim()[direction] - 1;
        for iter in mesher.layout().iter() {
            let c = iter.coordinates()[direction];
            if c == 0 || c == last {
                continue;
            }
            let i = iter.index();
            let hm = mesher.dminus(&iter, direction);
            let hp = mesher.dplus(&iter, direction);
            op.lower[i] = 2.0 / (hm * (hm + hp));
            op.diag[i] = -2.0 / (hm * hp);
            op.upper[i] = 2.0 / (hp * (hm + hp));
        }
        Self(op)
    }
}

triple_band_newtype!(SecondDerivativeOp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Concentrating1dMesher, FdmMesherComposite};
    use crate::finite_differences::operators::FdmLinearOp;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_for_quadratics_on_a_non_uniform_grid() {
        let m = FdmMesherComposite::from_1d(
            Concentrating1dMesher::new(-1.0, 1.0, 21, Some((0.2, 0.1)), false).unwrap(),
        )
        .unwrap();
        let op = SecondDerivativeOp::new(0, &m);
        let f = m.locations(0).map(|x| 1.5 * x * x + x);
        let d2f = op.apply(&f);
        assert_eq!(d2f[0], 0.0);
        assert_eq!(d2f[20], 0.0);
        for i in 1..20 {
            assert_abs_diff_eq!(d2f[i], 3.0, epsilon = 1e-8);
        }
    }
}
