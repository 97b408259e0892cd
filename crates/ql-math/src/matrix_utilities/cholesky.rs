//! Cholesky factorisation.

use crate::matrix::Matrix;
use ql_core::{ensure, errors::Result, fail};

/// Lower-triangular `L` with `L Lᵀ = m`.
///
/// Only the upper triangle of `m` is read. With `flexible` set, a
/// non-positive pivot produces a zero column instead of an error, which
/// turns the routine into a factorisation of positive semi-definite
/// matrices.
pub fn cholesky_decomposition(m: &Matrix, flexible: bool) -> Result<Matrix> {
    let size = m.rows();
    ensure!(
        size == m.cols(),
        "input matrix is not a square matrix: {} x {}",
        size,
        m.cols()
    );
    let mut l = Matrix::zeros(size, size);
    for i in 0..size {
        for j in i..size {
            let mut sum = m[(i, j)];
            for k in 0..i {
                sum -= l[(i, k)] * l[(j, k)];
            }
            if i == j {
                if !flexible && sum <= 0.0 {
                    fail!("input matrix is not positive definite (pivot {i} = {sum:e})");
                }
                l[(i, i)] = sum.max(0.0).sqrt();
            } else {
                let pivot = l[(i, i)];
                l[(j, i)] = if pivot == 0.0 { 0.0 } else { sum / pivot };
            }
        }
    }
    Ok(l)
}
