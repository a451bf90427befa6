mod cone;
mod cylinder;
mod polygon;
mod sphere;

use nalgebra::Unit;

use crate::geometry::{Aabb, Color, FloatType, Ray, WorldPoint, WorldVector};
use crate::scene::material::Material;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use polygon::Polygon;
pub use sphere::Sphere;

index_vec::define_index_type! {
    /// Position of a primitive in the scene's primitive list.
    /// Only meaningful for the BVH build it was obtained from, see `Primitive::id` for a stable identity.
    pub struct PrimitiveIdx = u32;
}

/// Geometric capabilities shared by all surface kinds.
pub trait Shape {
    /// Distance along the (normalized) ray to the nearest intersection in front of its origin.
    fn intersect(&self, ray: &Ray) -> Option<FloatType>;

    /// Unit normal at a point on the surface.
    fn normal(&self, point: &WorldPoint) -> Unit<WorldVector>;

    fn bounding_box(&self) -> Aabb;
}

#[derive(Clone, Debug)]
pub enum Geometry {
    Sphere(Sphere),
    Polygon(Polygon),
    Cylinder(Cylinder),
    Cone(Cone),
}

impl Shape for Geometry {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        match self {
            Geometry::Sphere(s) => s.intersect(ray),
            Geometry::Polygon(p) => p.intersect(ray),
            Geometry::Cylinder(c) => c.intersect(ray),
            Geometry::Cone(c) => c.intersect(ray),
        }
    }

    fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        match self {
            Geometry::Sphere(s) => s.normal(point),
            Geometry::Polygon(p) => p.normal(point),
            Geometry::Cylinder(c) => c.normal(point),
            Geometry::Cone(c) => c.normal(point),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Geometry::Sphere(s) => s.bounding_box(),
            Geometry::Polygon(p) => p.bounding_box(),
            Geometry::Cylinder(c) => c.bounding_box(),
            Geometry::Cone(c) => c.bounding_box(),
        }
    }
}

macro_rules! impl_into_geometry {
    ( $( $variant:ident ),* ) => {
        $(
            impl From<$variant> for Geometry {
                fn from(value: $variant) -> Self {
                    Geometry::$variant(value)
                }
            }
        )*
    };
}

impl_into_geometry!(Sphere, Polygon, Cylinder, Cone);

/// A renderable surface: geometry, material and a caller assigned identity.
/// The bounding box is computed on construction and never changes afterwards.
/// It always has a positive volume, degenerate axes are padded.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub id: u32,
    pub material: Material,
    geometry: Geometry,
    bounding_box: Aabb,
}

impl Primitive {
    pub fn new(id: u32, geometry: impl Into<Geometry>, material: Material) -> Primitive {
        let geometry = geometry.into();
        let bounding_box = geometry.bounding_box().padded();
        Primitive {
            id,
            material,
            geometry,
            bounding_box,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    pub fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        self.geometry.intersect(ray)
    }

    pub fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        self.geometry.normal(point)
    }

    /// Color of the surface at a hit point, before lighting.
    pub fn surface_color(&self, point: &WorldPoint) -> Color {
        let base = self
            .material
            .pattern
            .color_at(point, &self.material.color);

        match &self.material.texture {
            Some(mapping) => mapping
                .color_at(point, &self.normal(point))
                .unwrap_or(base),
            None => base,
        }
    }
}

/// Normalized vector, or the fallback if it is too short to have a direction.
fn normalize_or(v: WorldVector, fallback: Unit<WorldVector>) -> Unit<WorldVector> {
    Unit::try_new(v, crate::geometry::EPSILON).unwrap_or(fallback)
}

/// Nearest of the candidate distances.
fn nearest(candidates: impl IntoIterator<Item = Option<FloatType>>) -> Option<FloatType> {
    candidates.into_iter().flatten().reduce(FloatType::min)
}
