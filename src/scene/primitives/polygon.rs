use arrayvec::ArrayVec;
use nalgebra::Unit;

use crate::geometry::{Aabb, EPSILON, FloatType, HIT_EPSILON, Ray, WorldPoint, WorldVector};

use super::{Shape, normalize_or};

/// Rays this close to parallel with the plane miss it.
const PARALLEL_EPSILON: FloatType = 1e-4;

/// Relative distance of the fourth quad vertex from the plane of the first three that is still accepted.
const COPLANARITY_TOLERANCE: FloatType = 1e-3;

/// Flat convex triangle or quad.
/// Normal is `(c - b) x (a - b)` for vertices a, b, c, so counter-clockwise vertices
/// seen from the front give a normal pointing towards the viewer.
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: ArrayVec<WorldPoint, 4>,
    normal: Unit<WorldVector>,

    /// Degenerate, non-planar or non-convex polygons are kept, but never hit.
    valid: bool,
}

impl Polygon {
    pub fn triangle(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Polygon {
        Polygon::from_vertices([a, b, c].into_iter().collect())
    }

    pub fn quad(a: WorldPoint, b: WorldPoint, c: WorldPoint, d: WorldPoint) -> Polygon {
        Polygon::from_vertices([a, b, c, d].into_iter().collect())
    }

    fn from_vertices(vertices: ArrayVec<WorldPoint, 4>) -> Polygon {
        let raw_normal = (vertices[2] - vertices[1]).cross(&(vertices[0] - vertices[1]));
        let normal = Unit::try_new(raw_normal, EPSILON);

        let valid = match normal {
            None => {
                log::warn!("Degenerate polygon {vertices:?}, it will never be hit");
                false
            }
            Some(normal) => {
                if !is_planar(&vertices, &normal) {
                    log::warn!("Polygon {vertices:?} is not planar, it will never be hit");
                    false
                } else if !is_convex(&vertices, &normal) {
                    log::warn!("Polygon {vertices:?} is not convex, it will never be hit");
                    false
                } else {
                    true
                }
            }
        };

        Polygon {
            normal: normal.unwrap_or(WorldVector::y_axis()),
            vertices,
            valid,
        }
    }

    pub fn vertices(&self) -> &[WorldPoint] {
        &self.vertices
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Checks if a point in the polygon's plane lies strictly inside of it.
    pub fn is_inside(&self, point: &WorldPoint) -> bool {
        if !self.valid {
            return false;
        }
        edge_signs(&self.vertices, point, &self.normal).all(|s| s > 0.0)
    }

    /// Directions along the edges b-c and b-a, usable as axes for checkered patterns.
    pub fn edge_axes(&self) -> [Unit<WorldVector>; 2] {
        let v = &self.vertices;
        [
            normalize_or(v[2] - v[1], WorldVector::x_axis()),
            normalize_or(v[0] - v[1], WorldVector::z_axis()),
        ]
    }
}

/// For each edge, the (scaled) signed distance of the point from it, positive towards the inside.
fn edge_signs<'a>(
    vertices: &'a [WorldPoint],
    point: &'a WorldPoint,
    normal: &'a Unit<WorldVector>,
) -> impl Iterator<Item = FloatType> + 'a {
    let next = vertices.iter().cycle().skip(1);
    vertices
        .iter()
        .zip(next)
        .map(move |(a, b)| (b - a).cross(&(point - a)).dot(normal))
}

fn is_planar(vertices: &[WorldPoint], normal: &Unit<WorldVector>) -> bool {
    let scale = vertices
        .iter()
        .map(|v| (v - vertices[0]).norm())
        .fold(0.0, FloatType::max);
    vertices
        .iter()
        .all(|v| (v - vertices[0]).dot(normal).abs() <= COPLANARITY_TOLERANCE * scale)
}

fn is_convex(vertices: &[WorldPoint], normal: &Unit<WorldVector>) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        (b - a).cross(&(c - b)).dot(normal) > 0.0
    })
}

impl Shape for Polygon {
    fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        if !self.valid {
            return None;
        }

        let denominator = ray.direction.dot(&self.normal);
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.vertices[0] - ray.origin).dot(&self.normal) / denominator;
        if t <= HIT_EPSILON {
            return None;
        }

        if self.is_inside(&ray.point_at(t)) {
            Some(t)
        } else {
            None
        }
    }

    fn normal(&self, _point: &WorldPoint) -> Unit<WorldVector> {
        self.normal
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.vertices).unwrap_or(Aabb::new(self.vertices[0], self.vertices[0]))
    }
}
