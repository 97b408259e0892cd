//! Grid on caller-supplied points.

use super::{mesher_1d_newtype, Fdm1dMesher};
use ql_core::{errors::Result, Real};

/// Mesher on an explicit, strictly increasing list of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Predefined1dMesher(Fdm1dMesher);

impl Predefined1dMesher {
    /// Mesher through `x`.
    pub fn new(x: Vec<Real>) -> Result<Self> {
        Ok(Self(Fdm1dMesher::from_locations(x)?))
    }
}

mesher_1d_newtype!(Predefined1dMesher);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_points() {
        let m = Predefined1dMesher::new(vec![0.0, 0.5, 2.0]).unwrap();
        assert_eq!(m.locations(), &[0.0, 0.5, 2.0]);
        assert_eq!(m.dplus()[1], 1.5);
    }
}
