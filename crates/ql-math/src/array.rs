//! `Array`: a one-dimensional vector of reals.
//!
//! A newtype over `nalgebra::DVector<f64>`. Besides the usual vector algebra
//! it supports element-wise products and transcendental maps, which is what
//! the finite-difference operators need when they scale a stencil band by a
//! grid-dependent coefficient.

use nalgebra::DVector;
use ql_core::Real;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// A dynamically-sized 1D vector of `Real` values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(DVector<Real>);

impl Array {
    /// Zero-filled array of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self(DVector::zeros(n))
    }

    /// Array of length `n` filled with `value`.
    pub fn from_element(n: usize, value: Real) -> Self {
        Self(DVector::from_element(n, value))
    }

    /// Array built from a slice.
    pub fn from_slice(data: &[Real]) -> Self {
        Self(DVector::from_column_slice(data))
    }

    /// Array taking ownership of a `Vec`.
    pub fn from_vec(data: Vec<Real>) -> Self {
        Self(DVector::from_vec(data))
    }

    /// Array whose `i`-th element is `f(i)`.
    pub fn from_fn<F: FnMut(usize) -> Real>(n: usize, mut f: F) -> Self {
        Self(DVector::from_fn(n, |i, _| f(i)))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Elements as a slice.
    pub fn as_slice(&self) -> &[Real] {
        self.0.as_slice()
    }

    /// Elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        self.0.as_mut_slice()
    }

    /// Borrow the inner `DVector`.
    pub fn inner(&self) -> &DVector<Real> {
        &self.0
    }

    /// Iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Real> {
        self.as_slice().iter()
    }

    /// Mutable iterator over the elements.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Real> {
        self.as_mut_slice().iter_mut()
    }

    /// Copy of the elements as a `Vec`.
    pub fn to_vec(&self) -> Vec<Real> {
        self.as_slice().to_vec()
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: Real) {
        self.0.fill(value);
    }

    /// Dot product.
    pub fn dot(&self, other: &Array) -> Real {
        self.0.dot(&other.0)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> Real {
        self.0.norm()
    }

    /// Largest absolute element.
    pub fn norm_inf(&self) -> Real {
        self.iter().fold(0.0, |m, x| m.max(x.abs()))
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Real {
        self.0.sum()
    }

    /// Smallest element (`+∞` for an empty array).
    pub fn min(&self) -> Real {
        self.iter().copied().fold(Real::INFINITY, Real::min)
    }

    /// Largest element (`-∞` for an empty array).
    pub fn max(&self) -> Real {
        self.iter().copied().fold(Real::NEG_INFINITY, Real::max)
    }

    /// Apply `f` element-wise.
    pub fn map<F: Fn(Real) -> Real>(&self, f: F) -> Self {
        Self(self.0.map(f))
    }

    /// Combine two arrays of equal length element-wise.
    pub fn zip_map<F: Fn(Real, Real) -> Real>(&self, other: &Array, f: F) -> Self {
        debug_assert_eq!(self.len(), other.len(), "array length mismatch");
        Self(self.0.zip_map(&other.0, f))
    }

    /// Element-wise absolute value.
    pub fn abs(&self) -> Self {
        self.map(Real::abs)
    }

    /// Element-wise square root.
    pub fn sqrt(&self) -> Self {
        self.map(Real::sqrt)
    }

    /// Element-wise exponential.
    pub fn exp(&self) -> Self {
        self.map(Real::exp)
    }

    /// Element-wise natural logarithm.
    pub fn ln(&self) -> Self {
        self.map(Real::ln)
    }

    /// `self += a * x`.
    pub fn axpy(&mut self, a: Real, x: &Array) {
        self.0.axpy(a, &x.0, 1.0);
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<DVector<Real>> for Array {
    fn from(v: DVector<Real>) -> Self {
        Self(v)
    }
}

impl From<Vec<Real>> for Array {
    fn from(v: Vec<Real>) -> Self {
        Self::from_vec(v)
    }
}

impl From<&[Real]> for Array {
    fn from(s: &[Real]) -> Self {
        Self::from_slice(s)
    }
}

impl FromIterator<Real> for Array {
    fn from_iter<I: IntoIterator<Item = Real>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Real;
    type IntoIter = std::slice::Iter<'a, Real>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Index ─────────────────────────────────────────────────────────────────────

impl Index<usize> for Array {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        &self.0[i]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.0[i]
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────────

macro_rules! elementwise_op {
    ($trait:ident, $method:ident, |$a:ident, $b:ident| $body:expr) => {
        impl $trait<&Array> for &Array {
            type Output = Array;
            fn $method(self, rhs: &Array) -> Array {
                let ($a, $b) = (&self.0, &rhs.0);
                Array($body)
            }
        }

        impl $trait<Array> for Array {
            type Output = Array;
            fn $method(self, rhs: Array) -> Array {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Array> for Array {
            type Output = Array;
            fn $method(self, rhs: &Array) -> Array {
                (&self).$method(rhs)
            }
        }

        impl $trait<Array> for &Array {
            type Output = Array;
            fn $method(self, rhs: Array) -> Array {
                self.$method(&rhs)
            }
        }
    };
}

elementwise_op!(Add, add, |a, b| a + b);
elementwise_op!(Sub, sub, |a, b| a - b);
elementwise_op!(Mul, mul, |a, b| a.component_mul(b));
elementwise_op!(Div, div, |a, b| a.component_div(b));

impl Mul<Real> for &Array {
    type Output = Array;
    fn mul(self, rhs: Real) -> Array {
        Array(&self.0 * rhs)
    }
}

impl Mul<Real> for Array {
    type Output = Array;
    fn mul(self, rhs: Real) -> Array {
        Array(self.0 * rhs)
    }
}

impl Mul<&Array> for Real {
    type Output = Array;
    fn mul(self, rhs: &Array) -> Array {
        Array(&rhs.0 * self)
    }
}

impl Mul<Array> for Real {
    type Output = Array;
    fn mul(self, rhs: Array) -> Array {
        Array(rhs.0 * self)
    }
}

impl Add<Real> for &Array {
    type Output = Array;
    fn add(self, rhs: Real) -> Array {
        Array(self.0.add_scalar(rhs))
    }
}

impl Add<Real> for Array {
    type Output = Array;
    fn add(self, rhs: Real) -> Array {
        Array(self.0.add_scalar(rhs))
    }
}

impl Sub<Real> for &Array {
    type Output = Array;
    fn sub(self, rhs: Real) -> Array {
        Array(self.0.add_scalar(-rhs))
    }
}

impl Sub<&Array> for Real {
    type Output = Array;
    fn sub(self, rhs: &Array) -> Array {
        rhs.map(|x| self - x)
    }
}

impl Div<Real> for &Array {
    type Output = Array;
    fn div(self, rhs: Real) -> Array {
        Array(&self.0 / rhs)
    }
}

impl Div<Real> for Array {
    type Output = Array;
    fn div(self, rhs: Real) -> Array {
        Array(self.0 / rhs)
    }
}

impl Neg for &Array {
    type Output = Array;
    fn neg(self) -> Array {
        Array(-&self.0)
    }
}

impl Neg for Array {
    type Output = Array;
    fn neg(self) -> Array {
        Array(-self.0)
    }
}

impl AddAssign<&Array> for Array {
    fn add_assign(&mut self, rhs: &Array) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&Array> for Array {
    fn sub_assign(&mut self, rhs: &Array) {
        self.0 -= &rhs.0;
    }
}

impl MulAssign<Real> for Array {
    fn mul_assign(&mut self, rhs: Real) {
        self.0 *= rhs;
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

impl std::fmt::Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn element_wise_product_and_quotient() {
        let a = Array::from_slice(&[1.0, 2.0, 3.0]);
        let b = Array::from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!((&a * &b).as_slice(), &[4.0, 10.0, 18.0]);
        assert_eq!((&b / &a).as_slice(), &[4.0, 2.5, 2.0]);
    }

    #[test]
    fn scalar_arithmetic_mixes() {
        let a = Array::from_slice(&[1.0, -2.0]);
        assert_eq!((2.0 * &a).as_slice(), &[2.0, -4.0]);
        assert_eq!((&a + 1.0).as_slice(), &[2.0, -1.0]);
        assert_eq!((1.0 - &a).as_slice(), &[0.0, 3.0]);
        assert_eq!((-&a).as_slice(), &[-1.0, 2.0]);
    }

    #[test]
    fn axpy_accumulates() {
        let mut y = Array::from_element(3, 1.0);
        let x = Array::from_slice(&[1.0, 2.0, 3.0]);
        y.axpy(0.5, &x);
        assert_eq!(y.as_slice(), &[1.5, 2.0, 2.5]);
    }

    #[test]
    fn norms_and_extrema() {
        let a = Array::from_slice(&[3.0, -4.0]);
        assert_abs_diff_eq!(a.norm(), 5.0, epsilon = 1e-14);
        assert_abs_diff_eq!(a.norm_inf(), 4.0);
        assert_eq!(a.min(), -4.0);
        assert_eq!(a.max(), 3.0);
        assert_eq!(Array::zeros(0).max(), Real::NEG_INFINITY);
    }

    #[test]
    fn from_fn_and_collect_agree() {
        let a = Array::from_fn(4, |i| (i * i) as Real);
        let b: Array = (0..4).map(|i| (i * i) as Real).collect();
        assert_eq!(a, b);
    }
}
