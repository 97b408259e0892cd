//! Row-oriented sparse matrix.
//!
//! Finite-difference operators of arbitrary stencil width assemble their
//! matrix form here before it is applied or densified.

use crate::{array::Array, matrix::Matrix};
use ql_core::{errors::Error, errors::Result, Real};

/// Sparse matrix storing, per row, the non-zero entries sorted by column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseMatrix {
    cols: usize,
    rows: Vec<Vec<(usize, Real)>>,
}

impl SparseMatrix {
    /// Empty `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: vec![Vec::new(); rows],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Add `value` to entry `(i, j)`.
    pub fn add(&mut self, i: usize, j: usize, value: Real) -> Result<()> {
        self.check(i, j)?;
        let row = &mut self.rows[i];
        match row.binary_search_by_key(&j, |&(c, _)| c) {
            Ok(k) => row[k].1 += value,
            Err(k) => row.insert(k, (j, value)),
        }
        Ok(())
    }

    /// Entry `(i, j)`; zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> Result<Real> {
        self.check(i, j)?;
        let row = &self.rows[i];
        Ok(row
            .binary_search_by_key(&j, |&(c, _)| c)
            .map_or(0.0, |k| row[k].1))
    }

    /// Stored entries of row `i` as `(column, value)` pairs.
    pub fn row(&self, i: usize) -> &[(usize, Real)] {
        &self.rows[i]
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, x: &Array) -> Array {
        debug_assert_eq!(x.len(), self.cols, "vector length mismatch");
        Array::from_fn(self.rows(), |i| {
            self.rows[i].iter().map(|&(j, v)| v * x[j]).sum()
        })
    }

    /// Dense copy.
    pub fn to_dense(&self) -> Matrix {
        let mut m = Matrix::zeros(self.rows(), self.cols);
        for (i, row) in self.rows.iter().enumerate() {
            for &(j, v) in row {
                m[(i, j)] = v;
            }
        }
        m
    }

    fn check(&self, i: usize, j: usize) -> Result<()> {
        if i >= self.rows() {
            return Err(Error::IndexOutOfRange {
                index: i,
                size: self.rows(),
            });
        }
        if j >= self.cols {
            return Err(Error::IndexOutOfRange {
                index: j,
                size: self.cols,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_entries() {
        let mut m = SparseMatrix::new(3, 4);
        m.add(1, 2, 1.5).unwrap();
        m.add(1, 0, -1.0).unwrap();
        m.add(1, 2, 0.5).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), 2.0);
        assert_eq!(m.get(0, 0).unwrap(), 0.0);
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.row(1), &[(0, -1.0), (2, 2.0)]);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut m = SparseMatrix::new(2, 2);
        assert!(matches!(
            m.add(2, 0, 1.0),
            Err(Error::IndexOutOfRange { index: 2, size: 2 })
        ));
        assert!(m.get(0, 5).is_err());
    }

    #[test]
    fn product_matches_dense() {
        let mut m = SparseMatrix::new(2, 3);
        m.add(0, 0, 1.0).unwrap();
        m.add(0, 2, 2.0).unwrap();
        m.add(1, 1, -3.0).unwrap();
        let x = Array::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(m.mul_vec(&x), m.to_dense().mul_vec(&x));
        assert_eq!(m.mul_vec(&x).as_slice(), &[7.0, -6.0]);
    }
}
