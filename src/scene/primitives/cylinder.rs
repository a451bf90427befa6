use nalgebra::Unit;

use crate::geometry::{Aabb, EPSILON, FloatType, HIT_EPSILON, Ray, WorldPoint, WorldVector};

use super::{Shape, nearest, normalize_or};

/// Points closer than this to a cap plane get the cap normal.
const CAP_TOLERANCE: FloatType = 1e-4;

/// Closed cylinder aligned with the y axis, standing on `center` and extending `height` upwards.
#[derive(Clone, Debug)]
pub struct Cylinder {
    pub center: WorldPoint,
    pub radius: FloatType,
    pub height: FloatType,
}

impl Cylinder {
    pub fn new(center: WorldPoint, radius: FloatType, height: FloatType) -> Cylinder {
        Cylinder {
            center,
            radius,
            height,
        }
    }

    fn top(&self) -> FloatType {
        self.center.y + self.height
    }

    fn side_hits(&self, ray: &Ray) -> [Option<FloatType>; 2] {
        let d = ray.direction;
        let o = ray.origin - self.center;

        let a = d.x * d.x + d.z * d.z;
        if a < EPSILON {
            return [None, None];
        }
        let b = 2.0 * (d.x * o.x + d.z * o.z);
        let c = o.x * o.x + o.z * o.z - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return [None, None];
        }

        let sqrt_disc = discriminant.sqrt();
        [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)].map(|t| {
            let y = ray.origin.y + d.y * t;
            (t > HIT_EPSILON && y >= self.center.y && y <= self.top()).then_some(t)
        })
    }

    fn cap_hit(&self, ray: &Ray, cap_y: FloatType) -> Option<FloatType> {
        if ray.direction.y.abs() < EPSILON {
            return None;
        }
        let t = (cap_y - ray.origin.y) / ray.direction.y;
        if t <= HIT_EPSILON {
            return None;
        }
        let p = ray.point_at(t);
        let (dx, dz) = (p.x - self.center.x, p.z - self.center.z);
        (dx * dx + dz * dz <= self.radius * self.radius).then_some(t)
    }
}

impl Shape for Cylinder {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        let [s1, s2] = self.side_hits(ray);
        nearest([
            s1,
            s2,
            self.cap_hit(ray, self.center.y),
            self.cap_hit(ray, self.top()),
        ])
    }

    fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        if (point.y - self.top()).abs() < CAP_TOLERANCE {
            WorldVector::y_axis()
        } else if (point.y - self.center.y).abs() < CAP_TOLERANCE {
            -WorldVector::y_axis()
        } else {
            let radial = WorldVector::new(point.x - self.center.x, 0.0, point.z - self.center.z);
            normalize_or(radial, WorldVector::y_axis())
        }
    }

    fn bounding_box(&self) -> Aabb {
        let r = self.radius;
        Aabb::new(
            self.center - WorldVector::new(r, 0.0, r),
            self.center + WorldVector::new(r, self.height, r),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test::WorldPointWrapper;
    use crate::scene::primitives::test::check_hit;
    use assert2::{assert, let_assert};
    use test_case::test_case;

    fn test_cylinder() -> Cylinder {
        Cylinder::new(WorldPoint::new(0.0, -2.0, 0.0), 1.5, 4.0)
    }

    /// Distance from the closest of the three surface parts.
    fn residual(c: &Cylinder, p: &WorldPoint) -> FloatType {
        let radial = ((p.x - c.center.x).powi(2) + (p.z - c.center.z).powi(2)).sqrt();
        let side = (radial - c.radius).abs();
        let bottom = (p.y - c.center.y).abs();
        let top = (p.y - c.top()).abs();
        side.min(bottom).min(top)
    }

    #[test_case([0.0, 0.0, 10.0], [0.0, 0.0, -1.0], 8.5, [0.0, 0.0, 1.0] ; "side")]
    #[test_case([0.0, 10.0, 0.5], [0.0, -1.0, 0.0], 8.0, [0.0, 1.0, 0.0] ; "top cap")]
    #[test_case([0.5, -10.0, 0.0], [0.0, 1.0, 0.0], 8.0, [0.0, -1.0, 0.0] ; "bottom cap")]
    fn hits(origin: [f32; 3], direction: [f32; 3], expected_t: f32, expected_normal: [f32; 3]) {
        let c = test_cylinder();
        let ray = Ray::new(origin.into(), direction.into());
        let_assert!(Some(t) = c.intersect(&ray));
        assert!((t - expected_t).abs() < 1e-4);
        let n = c.normal(&ray.point_at(t));
        assert!((n.into_inner() - WorldVector::from(expected_normal)).norm() < 1e-5);
    }

    #[test]
    fn above_the_top_misses() {
        let ray = Ray::new(WorldPoint::new(0.0, 2.5, 10.0), WorldVector::new(0.0, 0.0, -1.0));
        assert!(test_cylinder().intersect(&ray).is_none());
    }

    #[test]
    fn side_hit_nearer_than_cap() {
        // Enters through the side, then would cross the top cap plane further away.
        let ray = Ray::new(WorldPoint::new(0.0, 1.0, 5.0), WorldVector::new(0.0, 0.2, -1.0));
        let c = test_cylinder();
        let_assert!(Some(t) = c.intersect(&ray));
        let p = ray.point_at(t);
        assert!((p.z - 1.5).abs() < 1e-3);
    }

    #[test]
    fn from_inside() {
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 0.0), WorldVector::new(1.0, 0.0, 0.0));
        let_assert!(Some(t) = test_cylinder().intersect(&ray));
        assert!((t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn bounding_box() {
        let b = test_cylinder().bounding_box();
        assert!(b.min == WorldPoint::new(-1.5, -2.0, -1.5));
        assert!(b.max == WorldPoint::new(1.5, 2.0, 1.5));
    }

    #[test_strategy::proptest]
    fn hits_lie_on_surface(origin: WorldPointWrapper, target: WorldPointWrapper) {
        let c = test_cylinder();
        let aim = WorldPoint::new(target.x * 0.1, target.y * 0.15, target.z * 0.1);
        let ray = Ray::new(*origin, aim - *origin);
        if let Some(t) = c.intersect(&ray) {
            check_hit(&c, &ray, t, |p| residual(&c, p));
        }
    }
}
