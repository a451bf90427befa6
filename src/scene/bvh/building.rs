use index_vec::IndexVec;
use ordered_float::OrderedFloat;

use crate::geometry::{Aabb, Axis};
use crate::scene::primitives::{Primitive, PrimitiveIdx};

use super::{Bvh, Node, NodeIdx, NodeKind};

impl Bvh {
    /// Build the hierarchy, reordering `primitives` in place.
    /// Indices into the primitive list obtained before the build are invalid afterwards.
    pub fn build(primitives: &mut IndexVec<PrimitiveIdx, Primitive>, leaf_size: usize) -> Bvh {
        let mut bvh = Bvh::default();

        if !primitives.is_empty() {
            bvh.build_recursive(primitives.raw.as_mut_slice(), 0, leaf_size.max(1));
        }

        log::debug!(
            "Built BVH with {} nodes over {} primitives",
            bvh.nodes.len(),
            primitives.len()
        );

        bvh
    }

    /// Builds a subtree over a non-empty range of primitives starting at index `first` of the
    /// full list, returns the index of its root node.
    fn build_recursive(
        &mut self,
        primitives: &mut [Primitive],
        first: usize,
        leaf_size: usize,
    ) -> NodeIdx {
        let bounding_box = enclosing_box(primitives);

        if primitives.len() <= leaf_size {
            return self.nodes.push(Node {
                bounding_box,
                kind: NodeKind::Leaf {
                    first: PrimitiveIdx::from_usize(first),
                    count: primitives.len() as u32,
                },
            });
        }

        let split = split_primitives(primitives, &bounding_box);

        // Create placeholder node that will be overwriten once the children are known
        let node_index = self.nodes.push(Node {
            bounding_box,
            kind: NodeKind::Leaf {
                first: PrimitiveIdx::from_usize(first),
                count: 0,
            },
        });

        let (left_primitives, right_primitives) = primitives.split_at_mut(split);
        let left = self.build_recursive(left_primitives, first, leaf_size);
        let right = self.build_recursive(right_primitives, first + split, leaf_size);

        self.nodes[node_index].kind = NodeKind::Inner { left, right };

        node_index
    }
}

fn enclosing_box(primitives: &[Primitive]) -> Aabb {
    primitives
        .iter()
        .map(|p| *p.bounding_box())
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| unreachable!("BVH nodes are never built over empty ranges"))
}

fn center_along(primitive: &Primitive, axis: Axis) -> OrderedFloat<f32> {
    OrderedFloat(primitive.bounding_box().center()[axis.index()])
}

/// Reorder the primitives along the largest axis of the box and return the index where the
/// range should be split.
/// The split is at the spatial midpoint of the box, falling back to the middle element if
/// all primitives end up on one side. Returned index is always in 1..len.
fn split_primitives(primitives: &mut [Primitive], enclosing_box: &Aabb) -> usize {
    let axis = enclosing_box.largest_axis();
    let midpoint = OrderedFloat(enclosing_box.center()[axis.index()]);

    // Stable, so that equal centers keep their relative order
    primitives.sort_by_key(|p| center_along(p, axis));

    let split = primitives.partition_point(|p| center_along(p, axis) <= midpoint);
    if split == 0 || split == primitives.len() {
        primitives.len() / 2
    } else {
        split
    }
}
