//! `Matrix`: a dense two-dimensional matrix of reals.
//!
//! A newtype around `nalgebra::DMatrix<f64>`. The decompositions in
//! [`matrix_utilities`](crate::matrix_utilities) work on this type, as does
//! the dense form of every finite-difference operator.

use crate::array::Array;
use nalgebra::DMatrix;
use ql_core::Real;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

/// A dynamically-sized dense matrix, indexed by `(row, column)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix(DMatrix<Real>);

impl Matrix {
    /// Zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(DMatrix::zeros(rows, cols))
    }

    /// Matrix filled with `value`.
    pub fn from_element(rows: usize, cols: usize, value: Real) -> Self {
        Self(DMatrix::from_element(rows, cols, value))
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self(DMatrix::identity(n, n))
    }

    /// Matrix built from row-major data.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[Real]) -> Self {
        Self(DMatrix::from_row_slice(rows, cols, data))
    }

    /// Matrix whose `(i, j)` entry is `f(i, j)`.
    pub fn from_fn<F: FnMut(usize, usize) -> Real>(rows: usize, cols: usize, f: F) -> Self {
        Self(DMatrix::from_fn(rows, cols, f))
    }

    /// Square matrix with `diag` on its diagonal.
    pub fn from_diagonal(diag: &Array) -> Self {
        Self(DMatrix::from_diagonal(diag.inner()))
    }

    /// Outer product `u vᵀ`.
    pub fn outer_product(u: &Array, v: &Array) -> Self {
        Self(u.inner() * v.inner().transpose())
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// Borrow the inner `DMatrix`.
    pub fn inner(&self) -> &DMatrix<Real> {
        &self.0
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Inverse, or `None` for a singular matrix.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.clone().try_inverse().map(Self)
    }

    /// Frobenius norm.
    pub fn norm(&self) -> Real {
        self.0.norm()
    }

    /// Maximum absolute row sum.
    pub fn norm_inf(&self) -> Real {
        (0..self.rows())
            .map(|i| self.0.row(i).iter().map(|x| x.abs()).sum::<Real>())
            .fold(0.0, Real::max)
    }

    /// Diagonal entries.
    pub fn diagonal(&self) -> Array {
        let n = self.rows().min(self.cols());
        Array::from_fn(n, |i| self.0[(i, i)])
    }

    /// Row `i` as an `Array`.
    pub fn row(&self, i: usize) -> Array {
        Array::from_fn(self.cols(), |j| self.0[(i, j)])
    }

    /// Column `j` as an `Array`.
    pub fn column(&self, j: usize) -> Array {
        Array::from_fn(self.rows(), |i| self.0[(i, j)])
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, v: &Array) -> Array {
        Array::from(&self.0 * v.inner())
    }

    /// Element-wise map.
    pub fn map<F: Fn(Real) -> Real>(&self, f: F) -> Self {
        Self(self.0.map(f))
    }

    /// Scalar multiple.
    pub fn scale(&self, scalar: Real) -> Self {
        Self(&self.0 * scalar)
    }
}

impl From<DMatrix<Real>> for Matrix {
    fn from(m: DMatrix<Real>) -> Self {
        Self(m)
    }
}

// ── Indexing ──────────────────────────────────────────────────────────────────

impl Index<(usize, usize)> for Matrix {
    type Output = Real;
    fn index(&self, (i, j): (usize, usize)) -> &Real {
        &self.0[(i, j)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Real {
        &mut self.0[(i, j)]
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────────

impl Add for &Matrix {
    type Output = Matrix;
    fn add(self, rhs: &Matrix) -> Matrix {
        Matrix(&self.0 + &rhs.0)
    }
}

impl Sub for &Matrix {
    type Output = Matrix;
    fn sub(self, rhs: &Matrix) -> Matrix {
        Matrix(&self.0 - &rhs.0)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: &Matrix) -> Matrix {
        Matrix(&self.0 * &rhs.0)
    }
}

impl Mul for Matrix {
    type Output = Matrix;
    fn mul(self, rhs: Matrix) -> Matrix {
        Matrix(self.0 * rhs.0)
    }
}

impl Mul<Real> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: Real) -> Matrix {
        Matrix(&self.0 * rhs)
    }
}

impl Neg for &Matrix {
    type Output = Matrix;
    fn neg(self) -> Matrix {
        Matrix(-&self.0)
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.rows() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for j in 0..self.cols() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.0[(i, j)])?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn multiply_and_transpose() {
        let a = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = Matrix::from_row_slice(2, 2, &[5.0, 6.0, 7.0, 8.0]);
        let c = &a * &b;
        assert_eq!(c[(0, 0)], 19.0);
        assert_eq!(c[(1, 1)], 50.0);
        assert_eq!(a.transpose()[(0, 1)], 3.0);
    }

    #[test]
    fn inverse_of_singular_matrix_is_none() {
        let m = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(m.try_inverse().is_none());
        let m = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let prod = &m * &m.try_inverse().unwrap();
        assert_abs_diff_eq!(prod[(0, 1)], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(prod[(1, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn outer_product_and_diagonal() {
        let u = Array::from_slice(&[1.0, 2.0]);
        let v = Array::from_slice(&[3.0, 4.0, 5.0]);
        let m = Matrix::outer_product(&u, &v);
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.column(2).as_slice(), &[5.0, 10.0]);
        assert_eq!(m.row(1).as_slice(), &[6.0, 8.0, 10.0]);
        let d = Matrix::from_diagonal(&u);
        assert_eq!(d.diagonal(), u);
        assert_eq!(d[(0, 1)], 0.0);
    }

    #[test]
    fn infinity_norm_is_max_row_sum() {
        let m = Matrix::from_row_slice(2, 2, &[1.0, -2.0, -3.0, 0.5]);
        assert_eq!(m.norm_inf(), 3.5);
    }

    #[test]
    fn matrix_vector_product() {
        let m = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let r = m.mul_vec(&Array::from_element(3, 1.0));
        assert_eq!(r.as_slice(), &[6.0, 15.0]);
    }
}
