//! Equally spaced grid.

use super::{mesher_1d_newtype, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Size};

/// `size` equidistant points from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform1dMesher(Fdm1dMesher);

impl Uniform1dMesher {
    /// Uniform grid on `[start, end]`.
    pub fn new(start: Real, end: Real, size: Size) -> Result<Self> {
        ensure!(end > start, "end ({end}) must be larger than start ({start})");
        ensure!(size >= 2, "a uniform mesher needs at least two points");
        let dx = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
        locations[size - 1] = end;
        Ok(Self(Fdm1dMesher::from_locations(locations)?))
    }
}

mesher_1d_newtype!(Uniform1dMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equal_spacing() {
        let m = Uniform1dMesher::new(-1.0, 1.0, 5).unwrap();
        assert_eq!(m.size(), 5);
        for (&p, &m) in m.dplus().iter().zip(m.dminus()) {
            assert_abs_diff_eq!(p, 0.5, epsilon = 1e-15);
            assert_abs_diff_eq!(m, 0.5, epsilon = 1e-15);
        }
        assert_eq!(m.locations()[4], 1.0);
    }

    #[test]
    fn empty_interval_is_rejected() {
        assert!(Uniform1dMesher::new(1.0, 1.0, 5).is_err());
    }
}
