mod aabb;
mod ray_box_intersection;

use nalgebra::{Point2, Point3, Unit, Vector2, Vector3};

pub use aabb::Aabb;
pub use ray_box_intersection::RayIntersectionExt;

pub type FloatType = f32;

pub type ScreenPoint = Point2<u32>;
pub type ScreenSize = Vector2<u32>;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;
pub type TexturePoint = Point2<FloatType>;

/// Linear RGB, nominally in 0-1.
pub type Color = Vector3<FloatType>;

/// Hits closer than this along a ray are treated as the surface the ray started on.
pub const HIT_EPSILON: FloatType = 1e-4;

/// Generic tolerance for near-zero tests in geometric solves.
pub const EPSILON: FloatType = 1e-6;

/// Secondary rays start this far off the surface, relative to the hit point's magnitude.
pub const SURFACE_OFFSET: FloatType = 1e-4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: WorldVector,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    pub inv_direction: WorldVector,
}

impl Ray {
    /// Zero length directions stay zero; such a ray never hits anything.
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let direction = direction
            .try_normalize(FloatType::MIN_POSITIVE)
            .unwrap_or_else(WorldVector::zeros);
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
        }
    }

    /// Ray leaving a surface point, with the origin moved off the surface to the side
    /// `direction` points to, so that rounding can't make the ray hit the surface it starts on.
    pub fn leaving(point: &WorldPoint, normal: &Unit<WorldVector>, direction: WorldVector) -> Ray {
        let side = if direction.dot(normal) < 0.0 { -1.0 } else { 1.0 };
        let offset = SURFACE_OFFSET * point.coords.amax().max(1.0) * side;
        Ray::new(point + normal.as_ref() * offset, direction)
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

/// Mirror `incident` around `normal` (both pointing the usual way, incident towards the surface).
pub fn reflect(incident: &WorldVector, normal: &Unit<WorldVector>) -> WorldVector {
    incident - normal.as_ref() * (2.0 * incident.dot(normal))
}

/// Snell's law refraction of a unit `incident` through a surface with unit `normal` facing
/// against it, with `eta` being the ratio of incident to transmitted refractive indices.
/// Returns None on total internal reflection.
pub fn refract(
    incident: &WorldVector,
    normal: &Unit<WorldVector>,
    eta: FloatType,
) -> Option<WorldVector> {
    let cos_i = -incident.dot(normal);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        None
    } else {
        Some(incident * eta + normal.as_ref() * (eta * cos_i - k.sqrt()))
    }
}

/// Inclusive tests are done with this much slack.
pub fn approx_eq(a: FloatType, b: FloatType, tolerance: FloatType) -> bool {
    (a - b).abs() <= tolerance
}

pub fn screen_size(width: u32, height: u32) -> ScreenSize {
    Vector2::new(width, height)
}

#[cfg(test)]
pub mod test {
    use super::*;
    use assert2::assert;
    use proptest::prelude::*;
    use test_case::test_case;

    /// Helper macro that creates a wrapper arnound a type that implemetns Deref and Arbitary
    macro_rules! arbitrary_wrapper {
        ( $wrapper_name:ident ( $type:ty ) -> $block:block ) => {
            #[derive(Copy, Clone, Debug)]
            pub struct $wrapper_name(pub $type);

            impl std::ops::Deref for $wrapper_name {
                type Target = $type;
                fn deref(&self) -> &$type {
                    &self.0
                }
            }

            impl Arbitrary for $wrapper_name {
                type Parameters = ();
                type Strategy = proptest::strategy::BoxedStrategy<Self>;
                fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
                    $block.prop_map(|x| $wrapper_name(x)).boxed()
                }
            }
        };
    }

    fn simple_float() -> BoxedStrategy<f32> {
        (-20_000i32..20_000i32).prop_map(|n| n as f32 * 1e-3).boxed()
    }

    arbitrary_wrapper! {
        NonzeroWorldVectorWrapper(WorldVector) -> {
            (simple_float(), simple_float(), simple_float())
                .prop_filter_map(
                    "vector is zero",
                    |coords| {
                        let vector = WorldVector::new(coords.0, coords.1, coords.2);
                        if vector.norm() < 1e-3 {
                            None
                        } else {
                            Some(vector)
                        }
                    })

        }
    }

    arbitrary_wrapper! {
        WorldPointWrapper(WorldPoint) -> {
            (simple_float(), simple_float(), simple_float())
                .prop_map(|coords| {
                    WorldPoint::new(coords.0, coords.1, coords.2)
                })
        }
    }

    #[test_strategy::proptest]
    fn ray_direction_is_normalized(origin: WorldPointWrapper, direction: NonzeroWorldVectorWrapper) {
        let ray = Ray::new(*origin, *direction);
        assert!(approx_eq(ray.direction.norm(), 1.0, 1e-5));
    }

    #[test]
    fn zero_direction_stays_zero() {
        let ray = Ray::new(WorldPoint::origin(), WorldVector::zeros());
        assert!(ray.direction == WorldVector::zeros());
        assert!(ray.inv_direction.iter().all(|x| x.is_infinite()));
    }

    #[test]
    fn leaving_ray_starts_on_its_side() {
        let normal = WorldVector::y_axis();
        let point = WorldPoint::new(50.0, 0.0, -80.0);

        let up = Ray::leaving(&point, &normal, WorldVector::new(1.0, 1.0, 0.0));
        assert!(up.origin.y > 0.0);
        assert!(up.origin.y < 0.1);
        assert!(up.origin.xz() == point.xz());

        let down = Ray::leaving(&point, &normal, WorldVector::new(1.0, -1.0, 0.0));
        assert!(down.origin.y < 0.0);
        assert!((down.direction - WorldVector::new(1.0, -1.0, 0.0).normalize()).norm() < 1e-6);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let normal = Unit::new_normalize(WorldVector::new(0.0, 1.0, 0.0));
        let reflected = reflect(&WorldVector::new(1.0, -1.0, 0.0), &normal);
        assert!(reflected == WorldVector::new(1.0, 1.0, 0.0));
    }

    #[test_case(1.0 ; "same medium")]
    #[test_case(1.0 / 1.5 ; "into glass")]
    fn refract_straight_on_keeps_direction(eta: f32) {
        let normal = Unit::new_normalize(WorldVector::new(0.0, 0.0, 1.0));
        let refracted = refract(&WorldVector::new(0.0, 0.0, -1.0), &normal, eta)
            .expect("Straight on refraction never reflects totally");
        assert!((refracted - WorldVector::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn refract_total_internal_reflection() {
        let normal = Unit::new_normalize(WorldVector::new(0.0, 1.0, 0.0));
        let grazing = WorldVector::new(1.0, -0.1, 0.0).normalize();
        assert!(refract(&grazing, &normal, 1.5).is_none());
    }

    #[test]
    fn refract_bends_towards_normal_entering_denser_medium() {
        let normal = Unit::new_normalize(WorldVector::new(0.0, 1.0, 0.0));
        let incident = WorldVector::new(1.0, -1.0, 0.0).normalize();
        let refracted = refract(&incident, &normal, 1.0 / 1.5).unwrap();
        assert!(approx_eq(refracted.norm(), 1.0, 1e-5));
        assert!(refracted.x < incident.x);
        assert!(refracted.x > 0.0);
    }
}
