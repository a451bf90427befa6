use crate::geometry::{Aabb, FloatType, Ray};

pub trait RayIntersectionExt {
    /// Calculate first and last ray intersection with the box
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType);

    /// Distance along the ray where it first enters the box, 0 if the ray starts inside.
    /// None if the ray misses or the box is entirely behind the origin.
    fn entry_distance(&self, ray: &Ray) -> Option<FloatType> {
        let (t1, t2) = self.intersect(ray);
        let t1 = t1.max(0.0);
        if t1 <= t2 { Some(t1) } else { None }
    }
}

impl RayIntersectionExt for Aabb {
    /// Returns minimum and maximum distance along the ray, ray intersects is min <= max.
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType) {
        let mut min_t = FloatType::NEG_INFINITY;
        let mut max_t = FloatType::INFINITY;

        for i in 0..3 {
            // The multiplication is NAN if the ray is starting inside the slab bounding plane
            // and is parallel to it. In this case we blend to +-infinity, so that the range becomes infinite
            let to_min = nan_to((self.min[i] - ray.origin[i]) * ray.inv_direction[i], FloatType::NEG_INFINITY);
            let to_max = nan_to((self.max[i] - ray.origin[i]) * ray.inv_direction[i], FloatType::INFINITY);

            min_t = min_t.max(to_min.min(to_max));
            max_t = max_t.min(to_min.max(to_max));
        }

        (min_t, max_t)
    }
}

fn nan_to(x: FloatType, replacement: FloatType) -> FloatType {
    if x.is_nan() { replacement } else { x }
}
