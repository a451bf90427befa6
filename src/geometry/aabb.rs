use crate::geometry::{Axis, FloatType, WorldPoint, WorldVector};

/// Extents smaller than this get padded so that every box has a positive volume.
const DEGENERATE_PADDING: FloatType = 1e-4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Aabb {
    pub fn new(min: WorldPoint, max: WorldPoint) -> Aabb {
        Aabb { min, max }
    }

    /// Smallest box containing all the points, padded along axes where it would be flat.
    /// Returns None for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<Aabb> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let bounds = iter.fold(Aabb::new(first, first), |acc, p| Aabb {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        });
        Some(bounds.padded())
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grow zero-thickness axes by a small amount on both sides.
    pub fn padded(&self) -> Aabb {
        let mut ret = *self;
        for i in 0..3 {
            if ret.max[i] - ret.min[i] <= 0.0 {
                ret.min[i] -= DEGENERATE_PADDING;
                ret.max[i] += DEGENERATE_PADDING;
            }
        }
        ret
    }

    pub fn size(&self) -> WorldVector {
        self.max - self.min
    }

    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    /// Axis with the largest extent, first one wins ties.
    pub fn largest_axis(&self) -> Axis {
        let size = self.size();
        let mut axis = Axis::X;
        if size.y > size.x {
            axis = Axis::Y;
        }
        if size.z > size.y && size.z > size.x {
            axis = Axis::Z;
        }
        axis
    }

    pub fn contains_point(&self, p: &WorldPoint, tolerance: FloatType) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tolerance && p[i] <= self.max[i] + tolerance)
    }

    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.contains_point(&other.min, 0.0) && self.contains_point(&other.max, 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::{assert, let_assert};
    use test_case::test_case;

    #[test]
    fn from_points_empty() {
        assert!(Aabb::from_points(std::iter::empty::<&WorldPoint>()).is_none());
    }

    #[test]
    fn from_points_pads_flat_axis() {
        let points = [
            WorldPoint::new(-1.0, 2.0, -1.0),
            WorldPoint::new(1.0, 2.0, 1.0),
            WorldPoint::new(0.5, 2.0, -0.5),
        ];
        let_assert!(Some(b) = Aabb::from_points(&points));

        assert!(b.min.x == -1.0);
        assert!(b.max.z == 1.0);
        assert!(b.min.y < 2.0);
        assert!(b.max.y > 2.0);
        assert!(b.size().iter().all(|x| *x > 0.0));
    }

    #[test]
    fn union_contains_both() {
        let a = Aabb::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0));
        let b = Aabb::new(WorldPoint::new(-2.0, 0.5, 3.0), WorldPoint::new(-1.0, 4.0, 5.0));
        let u = a.union(&b);

        assert!(u.contains_box(&a));
        assert!(u.contains_box(&b));
        assert!(u.min == WorldPoint::new(-2.0, 0.0, 0.0));
        assert!(u.max == WorldPoint::new(1.0, 4.0, 5.0));
    }

    #[test_case(3.0, 1.0, 1.0, Axis::X)]
    #[test_case(1.0, 3.0, 1.0, Axis::Y)]
    #[test_case(1.0, 1.0, 3.0, Axis::Z)]
    #[test_case(2.0, 2.0, 2.0, Axis::X ; "cube picks x")]
    #[test_case(1.0, 2.0, 2.0, Axis::Y ; "tie between y and z picks y")]
    fn largest_axis(x: f32, y: f32, z: f32, expected: Axis) {
        let b = Aabb::new(WorldPoint::origin(), WorldPoint::new(x, y, z));
        assert!(b.largest_axis() == expected);
    }
}
