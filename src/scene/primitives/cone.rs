use nalgebra::Unit;

use crate::geometry::{Aabb, EPSILON, FloatType, HIT_EPSILON, Ray, WorldPoint, WorldVector};

use super::{Shape, nearest, normalize_or};

/// Points closer than this to the base plane get the base normal.
const BASE_TOLERANCE: FloatType = 1e-4;

/// Discriminants below this count as a miss of the mantle.
const DISCRIMINANT_EPSILON: FloatType = 1e-6;

/// Right circular cone aligned with the y axis: base disc of `radius` around `center`,
/// apex `height` above it.
#[derive(Clone, Debug)]
pub struct Cone {
    pub center: WorldPoint,
    pub radius: FloatType,
    pub height: FloatType,
}

impl Cone {
    pub fn new(center: WorldPoint, radius: FloatType, height: FloatType) -> Cone {
        Cone {
            center,
            radius,
            height,
        }
    }

    pub fn apex(&self) -> WorldPoint {
        self.center + WorldVector::new(0.0, self.height, 0.0)
    }

    fn mantle_hits(&self, ray: &Ray) -> [Option<FloatType>; 2] {
        let slope = self.radius / self.height;
        let k = slope * slope;
        let d = ray.direction;
        let o = ray.origin - self.apex();

        let a = d.x * d.x + d.z * d.z - k * d.y * d.y;
        let b = 2.0 * (d.x * o.x + d.z * o.z - k * d.y * o.y);
        let c = o.x * o.x + o.z * o.z - k * o.y * o.y;

        let roots = if a.abs() < EPSILON {
            // Ray parallel to the mantle, at most one hit
            if b.abs() < EPSILON {
                return [None, None];
            }
            [Some(-c / b), None]
        } else {
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < DISCRIMINANT_EPSILON {
                return [None, None];
            }
            let sqrt_disc = discriminant.sqrt();
            [
                Some((-b - sqrt_disc) / (2.0 * a)),
                Some((-b + sqrt_disc) / (2.0 * a)),
            ]
        };

        // The quadratic also describes the mirrored cone above the apex
        roots.map(|t| {
            let t = t?;
            let y = ray.origin.y + d.y * t;
            (t > HIT_EPSILON && y >= self.center.y && y <= self.center.y + self.height).then_some(t)
        })
    }

    fn base_hit(&self, ray: &Ray) -> Option<FloatType> {
        if ray.direction.y.abs() < EPSILON {
            return None;
        }
        let t = (self.center.y - ray.origin.y) / ray.direction.y;
        if t <= HIT_EPSILON {
            return None;
        }
        let p = ray.point_at(t);
        let (dx, dz) = (p.x - self.center.x, p.z - self.center.z);
        (dx * dx + dz * dz <= self.radius * self.radius).then_some(t)
    }
}

impl Shape for Cone {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        let [m1, m2] = self.mantle_hits(ray);
        nearest([m1, m2, self.base_hit(ray)])
    }

    fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        if (point.y - self.center.y).abs() < BASE_TOLERANCE {
            return -WorldVector::y_axis();
        }
        let dx = point.x - self.center.x;
        let dz = point.z - self.center.z;
        let r = (dx * dx + dz * dz).sqrt();
        normalize_or(
            WorldVector::new(dx, r * self.radius / self.height, dz),
            WorldVector::y_axis(),
        )
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

    fn test_cone() -> Cone {
        Cone::new(WorldPoint::new(0.0, -1.0, 0.0), 2.0, 4.0)
    }

    /// Distance from the base disc plane or from the mantle, whichever is closer.
    fn residual(c: &Cone, p: &WorldPoint) -> FloatType {
        let radial = ((p.x - c.center.x).powi(2) + (p.z - c.center.z).powi(2)).sqrt();
        let mantle_radius = c.radius * (c.center.y + c.height - p.y) / c.height;
        (radial - mantle_radius).abs().min((p.y - c.center.y).abs())
    }

    #[test]
    fn mantle_hit_from_side() {
        // At y = 1 the cone's radius is 1
        let c = test_cone();
        let ray = Ray::new(WorldPoint::new(0.0, 1.0, 10.0), WorldVector::new(0.0, 0.0, -1.0));
        let_assert!(Some(t) = c.intersect(&ray));
        assert!((t - 9.0).abs() < 1e-4);

        let n = c.normal(&ray.point_at(t));
        assert!(n.z > 0.0 && n.y > 0.0);
        assert!(n.x.abs() < 1e-6);
        // Normal is perpendicular to the slant line going through the point
        let slant = WorldVector::new(0.0, 4.0, -2.0);
        assert!(n.dot(&slant).abs() < 1e-4);
    }

    #[test]
    fn base_hit_from_below() {
        let c = test_cone();
        let ray = Ray::new(WorldPoint::new(0.5, -5.0, 0.5), WorldVector::new(0.0, 1.0, 0.0));
        let_assert!(Some(t) = c.intersect(&ray));
        assert!((t - 4.0).abs() < 1e-4);
        assert!(c.normal(&ray.point_at(t)).into_inner() == WorldVector::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn mirrored_cone_above_apex_is_not_hit() {
        let c = test_cone();
        let ray = Ray::new(WorldPoint::new(0.0, 5.0, 10.0), WorldVector::new(0.0, 0.0, -1.0));
        assert!(c.intersect(&ray).is_none());
    }

    #[test]
    fn from_top_hits_near_apex() {
        let c = test_cone();
        let ray = Ray::new(WorldPoint::new(0.1, 10.0, 0.0), WorldVector::new(0.0, -1.0, 0.0));
        let_assert!(Some(t) = c.intersect(&ray));
        let p = ray.point_at(t);
        assert!((p.y - 2.8).abs() < 1e-3);
    }

    #[test]
    fn bounding_box_contains_apex_and_base() {
        let c = test_cone();
        let b = c.bounding_box();
        assert!(b.contains_point(&c.apex(), 0.0));
        assert!(b.contains_point(&WorldPoint::new(2.0, -1.0, 0.0), 0.0));
        assert!(b.min == WorldPoint::new(-2.0, -1.0, -2.0));
        assert!(b.max == WorldPoint::new(2.0, 3.0, 2.0));
    }

    #[test_strategy::proptest]
    fn hits_lie_on_surface(origin: WorldPointWrapper, target: WorldPointWrapper) {
        let c = test_cone();
        let aim = WorldPoint::new(target.x * 0.1, target.y * 0.1 + 1.0, target.z * 0.1);
        let ray = Ray::new(*origin, aim - *origin);
        if let Some(t) = c.intersect(&ray) {
            check_hit(&c, &ray, t, |p| residual(&c, p));
        }
    }
}
