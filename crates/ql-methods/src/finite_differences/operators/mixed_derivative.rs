//! Cross-derivative stencil.

use super::{FdmLinearOp, NinePointLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Size};
use ql_math::{Array, SparseMatrix};

/// `∂²/∂x∂y` over directions `d0` and `d1`, built as the tensor product of
/// the two first-derivative stencils (one-sided on the boundaries).
#[derive(Debug, Clone)]
pub struct SecondOrderMixedDerivativeOp(NinePointLinearOp);

fn first_derivative_weights(hm: Real, hp: Real, c: Size, last: Size) -> [Real; 3] {
    if c == 0 {
        [0.0, -1.0 / hp, 1.0 / hp]
    } else if c == last {
        [-1.0 / hm, 1.0 / hm, 0.0]
    } else {
        [
            -hp / (hm * (hm + hp)),
            (hp - hm) / (hm * hp),
            hm / (hp * (hm + hp)),
        ]
    }
}

impl SecondOrderMixedDerivativeOp {
    /// Stencil over directions `d0` and `d1` of `mesher`.
    pub fn new(d0: Size, d1: Size, mesher: &dyn FdmMesher) -> Self {
        let mut op = NinePointLinearOp::new(d0, d1, mesher);
        let dim = mesher.layout().dim();
        let (last0, last1) = (dim[d0] - 1, dim[d1] - 1);
        for iter in mesher.layout().iter() {
            let c = iter.coordinates();
            let w0 = first_derivative_weights(
                mesher.dminus(&iter, d0),
                mesher.dplus(&iter, d0),
                c[d0],
                last0,
            );
            let w1 = first_derivative_weights(
                mesher.dminus(&iter, d1),
                mesher.dplus(&iter, d1),
                c[d1],
                last1,
            );
            let a = &mut op.coefficients[iter.index()];
            for (k1, &b) in w1.iter().enumerate() {
                for (k0, &w) in w0.iter().enumerate() {
                    a[3 * k1 + k0] = w * b;
                }
            }
        }
        Self(op)
    }

    /// `diag(u)·L`.
    pub fn mult(&self, u: &Array) -> NinePointLinearOp {
        self.0.mult(u)
    }
}

impl std::ops::Deref for SecondOrderMixedDerivativeOp {
    type Target = NinePointLinearOp;

    fn deref(&self) -> &NinePointLinearOp {
        &self.0
    }
}

impl From<SecondOrderMixedDerivativeOp> for NinePointLinearOp {
    fn from(op: SecondOrderMixedDerivativeOp) -> Self {
        op.0
    }
}

impl FdmLinearOp for SecondOrderMixedDerivativeOp {
    fn apply(&self, r: &Array) -> Array {
        self.0.apply(r)
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        self.0.to_matrix()
    }
}
