//! Nine-point stencil over two directions.

use super::{FdmLinearOp, FdmLinearOpLayout};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Real, Size};
use ql_math::{Array, SparseMatrix};
use std::sync::Arc;

/// Neighbour offsets `(o0, o1)` in the order the coefficient arrays are
/// stored: `a[3·(o1+1) + (o0+1)]`.
const OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// `(L r)[i] = Σ a_k[i]·r[n_k[i]]` over the 3×3 block of neighbours of `i`
/// in directions `d0` and `d1`.
///
/// Corresponds to `QuantLib::NinePointLinearOp`.
#[derive(Debug, Clone)]
pub struct NinePointLinearOp {
    d0: Size,
    d1: Size,
    layout: Arc<FdmLinearOpLayout>,
    indices: Arc<[[Size; 9]]>,
    pub(crate) coefficients: Vec<[Real; 9]>,
}

impl NinePointLinearOp {
    /// Zero stencil over directions `d0` and `d1`.
    pub fn new(d0: Size, d1: Size, mesher: &dyn FdmMesher) -> Self {
        let layout = Arc::clone(mesher.layout());
        let indices: Vec<[Size; 9]> = layout
            .iter()
            .map(|iter| {
                OFFSETS.map(|(o0, o1)| match (o0, o1) {
                    (0, 0) => iter.index(),
                    (o0, 0) => layout.neighbourhood(&iter, d0, o0),
                    (0, o1) => layout.neighbourhood(&iter, d1, o1),
                    (o0, o1) => layout.neighbourhood2(&iter, d0, o0, d1, o1),
                })
            })
            .collect();
        let size = layout.size();
        Self {
            d0,
            d1,
            layout,
            indices: indices.into(),
            coefficients: vec![[0.0; 9]; size],
        }
    }

    /// The two directions.
    pub fn directions(&self) -> (Size, Size) {
        (self.d0, self.d1)
    }

    /// Weight of the neighbour at offset `(o0, o1)` in row `i`.
    pub fn coefficient(&self, i: Size, o0: i32, o1: i32) -> Real {
        self.coefficients[i][(3 * (o1 + 1) + (o0 + 1)) as usize]
    }

    /// `diag(u)·L`.
    pub fn mult(&self, u: &Array) -> NinePointLinearOp {
        let mut out = self.clone();
        for (row, &s) in out.coefficients.iter_mut().zip(u.iter()) {
            for a in row.iter_mut() {
                *a *= s;
            }
        }
        out
    }
}

impl FdmLinearOp for NinePointLinearOp {
    fn apply(&self, r: &Array) -> Array {
        debug_assert_eq!(r.len(), self.layout.size(), "inconsistent length of r");
        Array::from_fn(self.layout.size(), |i| {
            self.indices[i]
                .iter()
                .zip(&self.coefficients[i])
                .map(|(&j, &a)| a * r[j])
                .sum()
        })
    }

    fn to_matrix(&self) -> Result<SparseMatrix> {
        let n = self.layout.size();
        let mut m = SparseMatrix::new(n, n);
        for i in 0..n {
            for (&j, &a) in self.indices[i].iter().zip(&self.coefficients[i]) {
                m.add(i, j, a)?;
            }
        }
        Ok(m)
    }
}
