//! Index layout of a tensor-product grid.
//!
//! A grid with `dim = [n₀, n₁, …]` points per direction is stored as a flat
//! array with direction 0 varying fastest: the point with coordinates
//! `(c₀, c₁, …)` lives at `Σ cᵢ·spacingᵢ`.

use ql_core::{Integer, Size};

/// Flat index plus coordinates of one grid point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpIterator {
    index: Size,
    coordinates: Vec<Size>,
}

impl FdmLinearOpIterator {
    /// Position in the flat value array.
    pub fn index(&self) -> Size {
        self.index
    }

    /// Coordinates per direction.
    pub fn coordinates(&self) -> &[Size] {
        &self.coordinates
    }
}

/// Dimensions and strides of a grid.
///
/// Corresponds to `QuantLib::FdmLinearOpLayout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    size: Size,
    dim: Vec<Size>,
    spacing: Vec<Size>,
}

impl FdmLinearOpLayout {
    /// Layout for `dim[i]` points in direction `i`.
    pub fn new(dim: Vec<Size>) -> Self {
        let mut spacing = vec![1; dim.len()];
        for i in 1..dim.len() {
            spacing[i] = spacing[i - 1] * dim[i - 1];
        }
        let size = dim.iter().product();
        Self { size, dim, spacing }
    }

    /// Total number of points.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Points per direction.
    pub fn dim(&self) -> &[Size] {
        &self.dim
    }

    /// Stride per direction.
    pub fn spacing(&self) -> &[Size] {
        &self.spacing
    }

    /// Flat index of `coordinates`.
    pub fn index(&self, coordinates: &[Size]) -> Size {
        coordinates
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// All points in storage order.
    pub fn iter(&self) -> LayoutIter<'_> {
        LayoutIter {
            layout: self,
            current: FdmLinearOpIterator {
                index: 0,
                coordinates: vec![0; self.dim.len()],
            },
        }
    }

    /// Index of the point shifted by `offset` along direction `i`.
    ///
    /// Coordinates falling off the grid are reflected at the boundary, so
    /// `-1` maps to `1` and `n` maps to `n-2`.
    pub fn neighbourhood(&self, iter: &FdmLinearOpIterator, i: Size, offset: Integer) -> Size {
        let shift = self.reflected_shift(iter.coordinates[i], i, offset);
        (iter.index as isize + shift) as Size
    }

    /// Index of the point shifted along two directions at once.
    pub fn neighbourhood2(
        &self,
        iter: &FdmLinearOpIterator,
        i1: Size,
        offset1: Integer,
        i2: Size,
        offset2: Integer,
    ) -> Size {
        let shift1 = self.reflected_shift(iter.coordinates[i1], i1, offset1);
        let shift2 = self.reflected_shift(iter.coordinates[i2], i2, offset2);
        (iter.index as isize + shift1 + shift2) as Size
    }

    fn reflected_shift(&self, coordinate: Size, i: Size, offset: Integer) -> isize {
        let n = self.dim[i] as isize;
        let c = coordinate as isize;
        let mut shifted = c + offset as isize;
        if shifted < 0 {
            shifted = -shifted;
        } else if shifted >= n {
            shifted = 2 * (n - 1) - shifted;
        }
        (shifted - c) * self.spacing[i] as isize
    }
}

impl<'a> IntoIterator for &'a FdmLinearOpLayout {
    type Item = FdmLinearOpIterator;
    type IntoIter = LayoutIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the points of a layout.
#[derive(Debug, Clone)]
pub struct LayoutIter<'a> {
    layout: &'a FdmLinearOpLayout,
    current: FdmLinearOpIterator,
}

impl Iterator for LayoutIter<'_> {
    type Item = FdmLinearOpIterator;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.index >= self.layout.size {
            return None;
        }
        let item = self.current.clone();
        self.current.index += 1;
        for (c, &n) in self.current.coordinates.iter_mut().zip(&self.layout.dim) {
            *c += 1;
            if *c < n {
                break;
            }
            *c = 0;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.size.saturating_sub(self.current.index);
        (left, Some(left))
    }
}

impl ExactSizeIterator for LayoutIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spacing_and_size() {
        let layout = FdmLinearOpLayout::new(vec![3, 4, 2]);
        assert_eq!(layout.size(), 24);
        assert_eq!(layout.spacing(), &[1, 3, 12]);
        assert_eq!(layout.index(&[2, 1, 1]), 17);
    }

    #[test]
    fn iteration_visits_direction_zero_fastest() {
        let layout = FdmLinearOpLayout::new(vec![2, 3]);
        let coords: Vec<Vec<usize>> = layout.iter().map(|i| i.coordinates().to_vec()).collect();
        assert_eq!(coords[0], vec![0, 0]);
        assert_eq!(coords[1], vec![1, 0]);
        assert_eq!(coords[2], vec![0, 1]);
        assert_eq!(coords[5], vec![1, 2]);
        assert_eq!(layout.iter().len(), 6);
        for (k, it) in layout.iter().enumerate() {
            assert_eq!(it.index(), k);
            assert_eq!(layout.index(it.coordinates()), k);
        }
    }

    #[test]
    fn neighbours_reflect_at_the_boundary() {
        let layout = FdmLinearOpLayout::new(vec![4, 3]);
        let first = layout.iter().next().unwrap();
        assert_eq!(layout.neighbourhood(&first, 0, -1), 1);
        assert_eq!(layout.neighbourhood(&first, 0, 1), 1);
        assert_eq!(layout.neighbourhood(&first, 1, -2), 8);

        let last = layout.iter().last().unwrap();
        assert_eq!(last.coordinates(), &[3, 2]);
        assert_eq!(layout.neighbourhood(&last, 0, 1), layout.index(&[2, 2]));
        assert_eq!(layout.neighbourhood(&last, 1, 1), layout.index(&[3, 1]));
        assert_eq!(
            layout.neighbourhood2(&last, 0, -1, 1, -1),
            layout.index(&[2, 1])
        );
    }

    proptest! {
        #[test]
        fn interior_neighbours_shift_by_stride(
            n0 in 3usize..7, n1 in 3usize..7, c0 in 1usize..6, c1 in 1usize..6,
        ) {
            let c0 = c0.min(n0 - 2);
            let c1 = c1.min(n1 - 2);
            let layout = FdmLinearOpLayout::new(vec![n0, n1]);
            let idx = layout.index(&[c0, c1]);
            let it = layout.iter().nth(idx).unwrap();
            prop_assert_eq!(layout.neighbourhood(&it, 0, 1), idx + 1);
            prop_assert_eq!(layout.neighbourhood(&it, 1, -1), idx - n0);
            prop_assert_eq!(layout.neighbourhood2(&it, 0, 1, 1, 1), idx + 1 + n0);
        }
    }
}
