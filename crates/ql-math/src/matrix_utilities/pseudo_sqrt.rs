//! Pseudo square roots of (possibly not quite) positive semi-definite
//! matrices.
//!
//! Correlation matrices assembled from market quotes are often slightly
//! indefinite. A [`SalvagingAlgorithm`] selects how such a matrix is
//! repaired before its root is taken.

use super::cholesky::cholesky_decomposition;
use super::symmetric_schur::{check_symmetry, SymmetricSchurDecomposition};
use crate::array::Array;
use crate::matrix::Matrix;
use crate::optimization::{ConjugateGradient, CostFunction, EndCriteria, NoConstraint};
use ql_core::{ensure, errors::Result, fail, Real};
use tracing::{debug, warn};

/// Repair strategy for matrices with negative eigenvalues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SalvagingAlgorithm {
    /// No repair: plain Cholesky, failing on negative eigenvalues.
    #[default]
    None,
    /// Clamp negative eigenvalues to zero and rescale the rows.
    Spectral,
    /// Spectral root refined over unit rows in hyperspherical angles.
    Hypersphere,
    /// As `Hypersphere`, restricted to lower-triangular roots.
    LowerDiagonal,
    /// Nearest correlation matrix by alternating projections.
    Higham,
}

const HIGHAM_MAX_ITERATIONS: usize = 40;
const HIGHAM_TOLERANCE: Real = 1e-6;
const ANGLE_EPS: Real = 1e-16;

/// Rescale each row of `pseudo` so that `diag(pseudo pseudoᵀ) = diag(matrix)`.
fn normalize_pseudo_root(matrix: &Matrix, pseudo: &mut Matrix) {
    for i in 0..pseudo.rows() {
        let norm: Real = (0..pseudo.cols()).map(|j| pseudo[(i, j)].powi(2)).sum();
        if norm > 0.0 {
            let adj = (matrix[(i, i)] / norm).sqrt();
            for j in 0..pseudo.cols() {
                pseudo[(i, j)] *= adj;
            }
        }
    }
}

/// Unit-row root parametrised by hyperspherical angles.
///
/// The full parametrisation has `size - 1` angles per row stored at
/// `j * size + i`; the lower-triangular one uses `i (i - 1) / 2 + j`.
struct AngleRoot {
    size: usize,
    lower: bool,
}

impl AngleRoot {
    fn index(&self, i: usize, j: usize) -> usize {
        if self.lower {
            i * i.saturating_sub(1) / 2 + j
        } else {
            j * self.size + i
        }
    }

    fn angle_count(&self) -> usize {
        if self.lower {
            self.size * (self.size - 1) / 2
        } else {
            self.size * (self.size - 1)
        }
    }

    fn root(&self, theta: &Array) -> Matrix {
        let n = self.size;
        let mut r = Matrix::from_element(n, n, 1.0);
        for i in 0..n {
            // the last column of a full row, or the diagonal of a lower one,
            // carries only sines
            let last = if self.lower { i } else { n - 1 };
            for k in 0..n {
                if self.lower && k > i {
                    r[(i, k)] = 0.0;
                    continue;
                }
                for j in 0..=k {
                    if j == k && k != last {
                        r[(i, k)] *= theta[self.index(i, j)].cos();
                    } else if j != last {
                        r[(i, k)] *= theta[self.index(i, j)].sin();
                    }
                }
            }
        }
        r
    }

    /// Angles reproducing the unit rows of `unit_root` as closely as the
    /// clamping to `(-1, 1)` allows.
    fn angles(&self, unit_root: &Matrix) -> Array {
        let n = self.size;
        let mut theta = Array::zeros(self.angle_count());
        let clamp = |x: Real| x.clamp(-1.0 + ANGLE_EPS, 1.0 - ANGLE_EPS);
        for i in 0..n {
            let cols = if self.lower { i } else { n - 1 };
            for j in 0..cols {
                let idx = self.index(i, j);
                let mut t = clamp(unit_root[(i, j)]);
                for k in 0..j {
                    t = clamp(t / theta[self.index(i, k)].sin());
                }
                let mut angle = t.acos();
                let sign_entry = if self.lower { (i, i) } else { (i, j + 1) };
                if j + 1 == cols && unit_root[sign_entry] < 0.0 {
                    angle = -angle;
                }
                theta[idx] = angle;
            }
        }
        theta
    }
}

struct HypersphereCost<'a> {
    parametrisation: &'a AngleRoot,
    target: &'a Matrix,
    std_devs: &'a Array,
}

impl CostFunction for HypersphereCost<'_> {
    fn value(&self, theta: &Array) -> Result<Real> {
        let r = self.parametrisation.root(theta);
        let current = &r * &r.transpose();
        let n = self.target.rows();
        let mut error = 0.0;
        for i in 0..n {
            for j in 0..n {
                let diff = current[(i, j)] * self.std_devs[i] * self.std_devs[j]
                    - self.target[(i, j)];
                error += diff * diff;
            }
        }
        Ok(error)
    }
}

fn hypersphere_optimize(target: &Matrix, current_root: &Matrix, lower: bool) -> Result<Matrix> {
    let size = target.rows();
    let std_devs = Array::from_fn(size, |i| target[(i, i)].sqrt());

    let mut unit = current_root.clone();
    if lower {
        let approx = current_root * &current_root.transpose();
        unit = cholesky_decomposition(&approx, true)?;
        for i in 0..size {
            let s = approx[(i, i)].sqrt();
            for j in 0..size {
                unit[(i, j)] /= s;
            }
        }
    } else {
        for i in 0..size {
            for j in 0..size {
                unit[(i, j)] /= std_devs[i];
            }
        }
    }

    let parametrisation = AngleRoot { size, lower };
    let theta0 = parametrisation.angles(&unit);
    let cost = HypersphereCost {
        parametrisation: &parametrisation,
        target,
        std_devs: &std_devs,
    };
    let optimum = ConjugateGradient::new().minimize(
        &cost,
        &NoConstraint,
        &theta0,
        &EndCriteria::new(100, 10, 1e-8, 1e-8, 1e-8),
    )?;
    debug!(
        lower,
        cost = optimum.value,
        iterations = optimum.iterations,
        "hypersphere optimisation finished"
    );

    let mut result = parametrisation.root(&optimum.x);
    for i in 0..size {
        for j in 0..size {
            result[(i, j)] *= std_devs[i];
        }
    }
    Ok(result)
}

fn project_to_unit_diagonal(m: &Matrix) -> Matrix {
    let mut r = m.clone();
    for i in 0..r.rows() {
        r[(i, i)] = 1.0;
    }
    r
}

fn project_to_positive_semidefinite(m: &Matrix) -> Result<Matrix> {
    // projections drift from exact symmetry by rounding
    let sym = (m + &m.transpose()).scale(0.5);
    let jd = SymmetricSchurDecomposition::new(&sym)?;
    let clamped = jd.eigenvalues().map(|l| l.max(0.0));
    let v = jd.eigenvectors();
    Ok(&(v * &Matrix::from_diagonal(&clamped)) * &v.transpose())
}

/// Higham's alternating projections onto the unit-diagonal and
/// positive semi-definite cones.
fn higham(a: &Matrix) -> Result<Matrix> {
    let size = a.rows();
    let mut y = a.clone();
    let mut x = a.clone();
    let mut delta_s = Matrix::zeros(size, size);
    let mut last_x = x.clone();
    let mut last_y = y.clone();

    for iteration in 0..HIGHAM_MAX_ITERATIONS {
        let r = &y - &delta_s;
        x = project_to_positive_semidefinite(&r)?;
        delta_s = &x - &r;
        y = project_to_unit_diagonal(&x);

        let change = ((&x - &last_x).norm_inf() / x.norm_inf())
            .max((&y - &last_y).norm_inf() / y.norm_inf())
            .max((&y - &x).norm_inf() / y.norm_inf());
        if change <= HIGHAM_TOLERANCE {
            debug!(iterations = iteration + 1, "Higham projection converged");
            break;
        }
        last_x = x.clone();
        last_y = y.clone();
    }

    for i in 0..size {
        for j in 0..i {
            y[(i, j)] = y[(j, i)];
        }
    }
    Ok(y)
}

/// Spectral root `V √max(Λ, 0)`, rows rescaled to the diagonal of `matrix`.
/// Also reports whether any eigenvalue was negative.
fn spectral_root(matrix: &Matrix, jd: &SymmetricSchurDecomposition) -> (Matrix, bool) {
    let evs = jd.eigenvalues();
    let negative = evs.iter().any(|&l| l < 0.0);
    let diag = evs.map(|l| l.max(0.0).sqrt());
    let mut root = jd.eigenvectors() * &Matrix::from_diagonal(&diag);
    normalize_pseudo_root(matrix, &mut root);
    (root, negative)
}

/// Pseudo square root `S` with `S Sᵀ ≈ matrix`.
///
/// `matrix` must be square and symmetric.
pub fn pseudo_sqrt(matrix: &Matrix, sa: SalvagingAlgorithm) -> Result<Matrix> {
    check_symmetry(matrix)?;
    let size = matrix.rows();
    let jd = SymmetricSchurDecomposition::new(matrix)?;

    match sa {
        SalvagingAlgorithm::None => {
            let smallest = jd.eigenvalues()[size - 1];
            ensure!(smallest >= -1e-16, "negative eigenvalue(s) ({smallest:e})");
            cholesky_decomposition(matrix, true)
        }
        SalvagingAlgorithm::Spectral => {
            let (root, negative) = spectral_root(matrix, &jd);
            if negative {
                warn!("negative eigenvalues clamped to zero");
            }
            Ok(root)
        }
        SalvagingAlgorithm::Hypersphere | SalvagingAlgorithm::LowerDiagonal => {
            let (root, negative) = spectral_root(matrix, &jd);
            if !negative {
                return Ok(root);
            }
            let lower = sa == SalvagingAlgorithm::LowerDiagonal;
            warn!(lower, "repairing indefinite matrix by hypersphere optimisation");
            hypersphere_optimize(matrix, &root, lower)
        }
        SalvagingAlgorithm::Higham => {
            let adjusted = higham(matrix)?;
            cholesky_decomposition(&adjusted, true)
        }
    }
}

/// Pseudo square root of rank at most `max_rank`.
///
/// Keeps the leading eigenvalues until they explain
/// `component_retained_percentage` of the trace (always at least one), then
/// rescales the rows to reproduce the diagonal of `matrix`. Only the
/// `None`, `Spectral` and `Higham` repairs are supported.
pub fn rank_reduced_sqrt(
    matrix: &Matrix,
    max_rank: usize,
    component_retained_percentage: Real,
    sa: SalvagingAlgorithm,
) -> Result<Matrix> {
    check_symmetry(matrix)?;
    ensure!(component_retained_percentage > 0.0, "no eigenvalues retained");
    ensure!(
        component_retained_percentage <= 1.0,
        "percentage to be retained > 100%"
    );
    ensure!(max_rank >= 1, "max rank required < 1");
    let size = matrix.rows();

    let jd = match sa {
        SalvagingAlgorithm::None => {
            let jd = SymmetricSchurDecomposition::new(matrix)?;
            let smallest = jd.eigenvalues()[size - 1];
            ensure!(smallest >= -1e-16, "negative eigenvalue(s) ({smallest:e})");
            jd
        }
        SalvagingAlgorithm::Spectral => SymmetricSchurDecomposition::new(matrix)?,
        SalvagingAlgorithm::Higham => SymmetricSchurDecomposition::new(&higham(matrix)?)?,
        other => fail!("salvaging algorithm {other:?} not supported for rank reduction"),
    };
    let eigenvalues = jd.eigenvalues().map(|l| l.max(0.0));

    let mut enough = component_retained_percentage * eigenvalues.sum();
    if component_retained_percentage == 1.0 {
        // rounding may otherwise discard trailing factors
        enough *= 1.1;
    }
    let mut components = eigenvalues[0];
    let mut retained = 1;
    while components < enough && retained < size {
        components += eigenvalues[retained];
        retained += 1;
    }
    let retained = retained.min(max_rank);
    debug!(retained, size, "rank-reduced square root");

    let v = jd.eigenvectors();
    let mut result = Matrix::from_fn(size, retained, |i, j| v[(i, j)] * eigenvalues[j].sqrt());
    normalize_pseudo_root(matrix, &mut result);
    Ok(result)
}
