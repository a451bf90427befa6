use nalgebra::Unit;

use crate::geometry::{Aabb, FloatType, HIT_EPSILON, Ray, WorldPoint, WorldVector};

use super::{Shape, normalize_or};

/// Discriminants below this count as a miss, which also rejects grazing rays.
const DISCRIMINANT_EPSILON: FloatType = 1e-3;

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Sphere {
        Sphere { center, radius }
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - c;

        if discriminant < DISCRIMINANT_EPSILON {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = -b - sqrt_disc;
        let t2 = -b + sqrt_disc;
        if t1 > HIT_EPSILON {
            Some(t1)
        } else if t2 > HIT_EPSILON {
            Some(t2)
        } else {
            None
        }
    }

    fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        normalize_or(point - self.center, WorldVector::y_axis())
    }

    fn bounding_box(&self) -> Aabb {
        let r_vec = WorldVector::repeat(self.radius);
        Aabb::new(self.center - r_vec, self.center + r_vec)
    }
}
