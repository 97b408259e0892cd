//! Grid concentrated around a critical point.
//!
//! With `u` uniform on `[0, 1]` the points are
//! `x(u) = c + δ·sinh(c₁(1−u) + c₂u)`, where `δ = density·(end − start)`,
//! `c₁ = asinh((start − c)/δ)` and `c₂ = asinh((end − c)/δ)`. Small densities
//! pack points tightly around `c`.

use super::{mesher_1d_newtype, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Size};
use ql_math::{
    close,
    interpolations::{Interpolation1D, LinearInterpolation},
};

/// Sinh-transformed grid around `c_point`.
///
/// Corresponds to `QuantLib::Concentrating1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Concentrating1dMesher(Fdm1dMesher);

impl Concentrating1dMesher {
    /// Grid on `[start, end]` concentrated at `c_point = (c, density)`.
    ///
    /// Without a critical point the grid is uniform. With
    /// `require_c_point` the point `c` itself is a grid node.
    pub fn new(
        start: Real,
        end: Real,
        size: Size,
        c_point: Option<(Real, Real)>,
        require_c_point: bool,
    ) -> Result<Self> {
        ensure!(end > start, "end ({end}) must be larger than start ({start})");
        ensure!(size >= 2, "a mesher needs at least two points");
        let dx = 1.0 / (size - 1) as Real;
        let mut locations = vec![0.0; size];

        match c_point {
            Some((c, density)) => {
                ensure!(
                    c >= start && c <= end,
                    "critical point {c} must be between {start} and {end}"
                );
                ensure!(density > 0.0, "density must be positive, got {density}");
                let density = density * (end - start);
                let c1 = ((start - c) / density).asinh();
                let c2 = ((end - c) / density).asinh();

                let transform = if require_c_point {
                    let mut u = vec![0.0];
                    let mut z = vec![0.0];
                    if !close(c, start) && !close(c, end) {
                        let z0 = -c1 / (c2 - c1);
                        let n = (size - 1) as Real;
                        let u0 = (z0 * n).round().clamp(1.0, n - 1.0) / n;
                        u.push(u0);
                        z.push(z0);
                    }
                    u.push(1.0);
                    z.push(1.0);
                    Some(LinearInterpolation::new(&u, &z)?)
                } else {
                    None
                };

                for (i, loc) in locations.iter_mut().enumerate().take(size - 1).skip(1) {
                    let ui = i as Real * dx;
                    let li = transform.as_ref().map_or(ui, |t| t.value(ui));
                    *loc = c + density * (c1 * (1.0 - li) + c2 * li).sinh();
                }
            }
            None => {
                for (i, loc) in locations.iter_mut().enumerate() {
                    *loc = start + i as Real * dx * (end - start);
                }
            }
        }
        locations[0] = start;
        locations[size - 1] = end;
        Ok(Self(Fdm1dMesher::from_locations(locations)?))
    }
}

mesher_1d_newtype!(Concentrating1dMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn points_cluster_at_the_critical_point() {
        let m = Concentrating1dMesher::new(0.0, 10.0, 51, Some((3.0, 0.05)), false).unwrap();
        let x = m.locations();
        assert_eq!(x[0], 0.0);
        assert_eq!(x[50], 10.0);
        let near = x.windows(2).position(|w| w[0] <= 3.0 && w[1] > 3.0).unwrap();
        let spacing_at_c = x[near + 1] - x[near];
        assert!(spacing_at_c < m.dplus()[0]);
        assert!(spacing_at_c < m.dminus()[50]);
    }

    #[test]
    fn required_critical_point_is_a_node() {
        let m = Concentrating1dMesher::new(-1.0, 2.0, 40, Some((0.3, 0.1)), true).unwrap();
        assert!(m.locations().iter().any(|&x| (x - 0.3).abs() < 1e-12));
    }

    #[test]
    fn uniform_without_critical_point() {
        let m = Concentrating1dMesher::new(0.0, 1.0, 11, None, false).unwrap();
        for &d in m.dplus() {
            assert_abs_diff_eq!(d, 0.1, epsilon = 1e-14);
        }
    }

    #[test]
    fn critical_point_outside_is_rejected() {
        assert!(Concentrating1dMesher::new(0.0, 1.0, 11, Some((2.0, 0.1)), false).is_err());
        assert!(Concentrating1dMesher::new(0.0, 1.0, 11, Some((0.5, 0.0)), false).is_err());
    }
}
