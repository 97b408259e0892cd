//! Eigen-decomposition of a real symmetric matrix by cyclic Jacobi rotations.
//!
//! Eigenvalues come out in decreasing order; the eigenvectors are the
//! columns of [`eigenvectors`](SymmetricSchurDecomposition::eigenvectors),
//! each with a non-negative first component.

use crate::{array::Array, matrix::Matrix};
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, QL_EPSILON,
};

const MAX_SWEEPS: usize = 100;
const EPS_PREC: Real = 1e-15;

/// `m = V diag(λ) Vᵀ` for symmetric `m`.
#[derive(Debug, Clone)]
pub struct SymmetricSchurDecomposition {
    eigenvalues: Array,
    eigenvectors: Matrix,
}

/// Fail unless `m` is square and symmetric up to rounding.
pub(crate) fn check_symmetry(m: &Matrix) -> Result<()> {
    let size = m.rows();
    ensure!(
        size == m.cols(),
        "non square matrix: {size} rows, {} columns",
        m.cols()
    );
    let scale = m.inner().amax();
    for i in 0..size {
        for j in 0..i {
            let (a, b) = (m[(i, j)], m[(j, i)]);
            ensure!(
                (a - b).abs() <= 42.0 * QL_EPSILON * scale,
                "non symmetric matrix: [{i}][{j}] = {a}, [{j}][{i}] = {b}"
            );
        }
    }
    Ok(())
}

fn jacobi_rotate(m: &mut Matrix, rot: Real, dil: Real, a: (usize, usize), b: (usize, usize)) {
    let x1 = m[a];
    let x2 = m[b];
    m[a] = x1 - dil * (x2 + x1 * rot);
    m[b] = x2 + dil * (x1 - x2 * rot);
}

impl SymmetricSchurDecomposition {
    /// Decompose `s`; fails for empty, non-square or non-symmetric input.
    pub fn new(s: &Matrix) -> Result<Self> {
        let size = s.rows();
        ensure!(size > 0, "null matrix given");
        check_symmetry(s)?;

        let mut diagonal: Vec<Real> = (0..size).map(|q| s[(q, q)]).collect();
        let mut vectors = Matrix::identity(size);
        let mut ss = s.clone();
        let mut tmp_diag = diagonal.clone();
        let mut accumulate = vec![0.0; size];

        let mut converged = false;
        for sweep in 1..=MAX_SWEEPS {
            let mut sum = 0.0;
            for a in 0..size - 1 {
                for b in a + 1..size {
                    sum += ss[(a, b)].abs();
                }
            }
            if sum == 0.0 {
                converged = true;
                break;
            }
            let threshold = if sweep < 5 {
                0.2 * sum / (size * size) as Real
            } else {
                0.0
            };

            for j in 0..size - 1 {
                for k in j + 1..size {
                    let small = ss[(j, k)].abs();
                    if sweep > 5
                        && small < EPS_PREC * diagonal[j].abs()
                        && small < EPS_PREC * diagonal[k].abs()
                    {
                        ss[(j, k)] = 0.0;
                    } else if small > threshold {
                        let gap = diagonal[k] - diagonal[j];
                        let tang = if small < EPS_PREC * gap.abs() {
                            ss[(j, k)] / gap
                        } else {
                            let beta = 0.5 * gap / ss[(j, k)];
                            let t = 1.0 / (beta.abs() + (1.0 + beta * beta).sqrt());
                            if beta < 0.0 {
                                -t
                            } else {
                                t
                            }
                        };
                        let cosine = 1.0 / (1.0 + tang * tang).sqrt();
                        let sine = tang * cosine;
                        let rho = sine / (1.0 + cosine);
                        let shift = tang * ss[(j, k)];
                        accumulate[j] -= shift;
                        accumulate[k] += shift;
                        diagonal[j] -= shift;
                        diagonal[k] += shift;
                        ss[(j, k)] = 0.0;
                        for l in 0..j {
                            jacobi_rotate(&mut ss, rho, sine, (l, j), (l, k));
                        }
                        for l in j + 1..k {
                            jacobi_rotate(&mut ss, rho, sine, (j, l), (l, k));
                        }
                        for l in k + 1..size {
                            jacobi_rotate(&mut ss, rho, sine, (j, l), (k, l));
                        }
                        for l in 0..size {
                            jacobi_rotate(&mut vectors, rho, sine, (l, j), (l, k));
                        }
                    }
                }
            }
            for k in 0..size {
                tmp_diag[k] += accumulate[k];
                diagonal[k] = tmp_diag[k];
                accumulate[k] = 0.0;
            }
        }
        if !converged {
            return Err(Error::Convergence {
                method: "symmetric Schur decomposition",
                iterations: MAX_SWEEPS,
                error: (0..size)
                    .flat_map(|a| (a + 1..size).map(move |b| (a, b)))
                    .map(|(a, b)| ss[(a, b)].abs())
                    .sum(),
            });
        }

        let mut order: Vec<usize> = (0..size).collect();
        order.sort_by(|&a, &b| diagonal[b].total_cmp(&diagonal[a]));
        let max_ev = diagonal[order[0]];

        let mut eigenvalues = Array::zeros(size);
        let mut eigenvectors = Matrix::zeros(size, size);
        for (col, &src) in order.iter().enumerate() {
            let ev = diagonal[src];
            eigenvalues[col] = if max_ev != 0.0 && (ev / max_ev).abs() < 1e-16 {
                0.0
            } else {
                ev
            };
            let sign = if vectors[(0, src)] < 0.0 { -1.0 } else { 1.0 };
            for row in 0..size {
                eigenvectors[(row, col)] = sign * vectors[(row, src)];
            }
        }
        Ok(Self {
            eigenvalues,
            eigenvectors,
        })
    }

    /// Eigenvalues in decreasing order.
    pub fn eigenvalues(&self) -> &Array {
        &self.eigenvalues
    }

    /// Eigenvectors as columns, matching [`eigenvalues`](Self::eigenvalues).
    pub fn eigenvectors(&self) -> &Matrix {
        &self.eigenvectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand_mt::Mt19937GenRand64;

    fn reconstruct(d: &SymmetricSchurDecomposition) -> Matrix {
        let v = d.eigenvectors();
        &(v * &Matrix::from_diagonal(d.eigenvalues())) * &v.transpose()
    }

    #[test]
    fn known_eigensystem() {
        let m = Matrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        let d = SymmetricSchurDecomposition::new(&m).unwrap();
        assert_abs_diff_eq!(d.eigenvalues()[0], 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d.eigenvalues()[1], 1.0, epsilon = 1e-14);
        let h = 0.5_f64.sqrt();
        assert_abs_diff_eq!(d.eigenvectors()[(0, 0)], h, epsilon = 1e-14);
        assert_abs_diff_eq!(d.eigenvectors()[(1, 0)], h, epsilon = 1e-14);
        assert_abs_diff_eq!(d.eigenvectors()[(0, 1)], h, epsilon = 1e-14);
        assert_abs_diff_eq!(d.eigenvectors()[(1, 1)], -h, epsilon = 1e-14);
    }

    #[test]
    fn reconstructs_random_symmetric_matrices() {
        let mut rng = Mt19937GenRand64::new(42);
        for size in [3, 5, 8] {
            let a = Matrix::from_fn(size, size, |_, _| {
                rng.next_u64() as Real / u64::MAX as Real - 0.5
            });
            let m = &a + &a.transpose();
            let d = SymmetricSchurDecomposition::new(&m).unwrap();
            let r = reconstruct(&d);
            for i in 0..size {
                for j in 0..size {
                    assert_abs_diff_eq!(r[(i, j)], m[(i, j)], epsilon = 1e-12);
                }
            }
            let evs = d.eigenvalues();
            assert!((1..size).all(|i| evs[i - 1] >= evs[i]));
            assert!((0..size).all(|c| d.eigenvectors()[(0, c)] >= 0.0));
            let vtv = &d.eigenvectors().transpose() * d.eigenvectors();
            for i in 0..size {
                assert_abs_diff_eq!(vtv[(i, i)], 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rejects_non_symmetric_input() {
        let m = Matrix::from_row_slice(2, 2, &[1.0, 0.5, 0.4, 1.0]);
        assert!(SymmetricSchurDecomposition::new(&m).is_err());
        assert!(SymmetricSchurDecomposition::new(&Matrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn zero_matrix_has_zero_spectrum() {
        let d = SymmetricSchurDecomposition::new(&Matrix::zeros(3, 3)).unwrap();
        assert_eq!(d.eigenvalues().as_slice(), &[0.0, 0.0, 0.0]);
    }
}
