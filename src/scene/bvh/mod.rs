mod building;
mod printing;
mod ray_bvh_intersection;

use index_vec::IndexVec;

use crate::geometry::Aabb;
use crate::scene::primitives::PrimitiveIdx;

pub use ray_bvh_intersection::{QueryStats, StackCache};

/// Ranges of at most this many primitives become leaves.
pub const DEFAULT_LEAF_SIZE: usize = 2;

/// Bounding volume hierarchy over a scene's primitive list.
///
/// Nodes live in a flat arena with the root at index 0. Building reorders the primitive list
/// so that every leaf references a contiguous range of it.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: IndexVec<NodeIdx, Node>,
}

#[derive(Clone, Debug)]
struct Node {
    bounding_box: Aabb,
    kind: NodeKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum NodeKind {
    Inner { left: NodeIdx, right: NodeIdx },
    Leaf { first: PrimitiveIdx, count: u32 },
}

index_vec::define_index_type! {
    pub struct NodeIdx = u32;
}

impl Bvh {
    fn root() -> NodeIdx {
        NodeIdx::new(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Box around the whole scene, None for an empty hierarchy.
    pub fn bounding_box(&self) -> Option<&Aabb> {
        self.nodes.first().map(|node| &node.bounding_box)
    }
}

#[cfg(test)]
mod test {
    use index_vec::IndexVec;

    use super::*;
    use crate::geometry::WorldPoint;
    use crate::scene::material::Material;
    use crate::scene::primitives::{Primitive, Sphere};
    use assert2::{assert, let_assert};

    pub fn spheres(centers: &[[f32; 3]]) -> IndexVec<PrimitiveIdx, Primitive> {
        centers
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Primitive::new(
                    i as u32,
                    Sphere::new(WorldPoint::from(*c), 0.5),
                    Material::default(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_scene() {
        let mut primitives = spheres(&[]);
        let bvh = Bvh::build(&mut primitives, DEFAULT_LEAF_SIZE);
        assert!(bvh.is_empty());
        assert!(bvh.bounding_box().is_none());
    }

    #[test]
    fn root_box_covers_everything() {
        let mut primitives = spheres(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, -5.0, 3.0]]);
        let bvh = Bvh::build(&mut primitives, DEFAULT_LEAF_SIZE);
        let_assert!(Some(b) = bvh.bounding_box());
        for p in primitives.iter() {
            assert!(b.contains_box(p.bounding_box()));
        }
    }
}
