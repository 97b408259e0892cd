//! Conversions between covariance and (volatility, correlation) pairs.

use crate::{array::Array, matrix::Matrix};
use ql_core::{ensure, errors::Result, Real};

/// Covariance matrix `Σ_ij = ½(ρ_ij + ρ_ji) σ_i σ_j`.
///
/// `corr` must be square, match `vols` in size and be symmetric within
/// `tolerance`.
pub fn get_covariance(vols: &[Real], corr: &Matrix, tolerance: Real) -> Result<Matrix> {
    let size = vols.len();
    ensure!(
        corr.rows() == size && corr.cols() == size,
        "correlation matrix is {}x{}, volatilities have size {size}",
        corr.rows(),
        corr.cols()
    );
    let mut cov = Matrix::zeros(size, size);
    for i in 0..size {
        for j in 0..i {
            ensure!(
                (corr[(i, j)] - corr[(j, i)]).abs() <= tolerance,
                "correlation matrix not symmetric: [{i}][{j}] = {}, [{j}][{i}] = {}",
                corr[(i, j)],
                corr[(j, i)]
            );
            let c = 0.5 * (corr[(i, j)] + corr[(j, i)]) * vols[i] * vols[j];
            cov[(i, j)] = c;
            cov[(j, i)] = c;
        }
        cov[(i, i)] = vols[i] * vols[i];
    }
    Ok(cov)
}

/// Variances, standard deviations and correlations of a covariance matrix.
#[derive(Debug, Clone)]
pub struct CovarianceDecomposition {
    variances: Array,
    std_devs: Array,
    correlation: Matrix,
}

impl CovarianceDecomposition {
    /// Split `cov`, which must be square, symmetric within `tolerance` and
    /// have a non-negative diagonal.
    pub fn new(cov: &Matrix, tolerance: Real) -> Result<Self> {
        let size = cov.rows();
        ensure!(
            size == cov.cols(),
            "input matrix is not square: {size}x{}",
            cov.cols()
        );
        let variances = cov.diagonal();
        ensure!(
            variances.iter().all(|&v| v >= 0.0),
            "negative variance on the diagonal"
        );
        let std_devs = variances.sqrt();
        let mut correlation = Matrix::identity(size);
        for i in 0..size {
            for j in 0..i {
                ensure!(
                    (cov[(i, j)] - cov[(j, i)]).abs() <= tolerance,
                    "invalid covariance matrix: [{i}][{j}] = {}, [{j}][{i}] = {}",
                    cov[(i, j)],
                    cov[(j, i)]
                );
                let c = cov[(i, j)] / (std_devs[i] * std_devs[j]);
                correlation[(i, j)] = c;
                correlation[(j, i)] = c;
            }
        }
        Ok(Self {
            variances,
            std_devs,
            correlation,
        })
    }

    /// Diagonal of the covariance matrix.
    pub fn variances(&self) -> &Array {
        &self.variances
    }

    /// Square roots of the variances.
    pub fn standard_deviations(&self) -> &Array {
        &self.std_devs
    }

    /// Correlation matrix with unit diagonal.
    pub fn correlation_matrix(&self) -> &Matrix {
        &self.correlation
    }
}
