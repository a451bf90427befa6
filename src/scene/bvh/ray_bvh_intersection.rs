use std::ops::AddAssign;

use assert2::debug_assert;
use index_vec::{IndexSlice, IndexVec};

use super::{Bvh, NodeIdx, NodeKind};
use crate::geometry::{FloatType, Ray, RayIntersectionExt as _};
use crate::scene::primitives::{Primitive, PrimitiveIdx};

/// Reusable traversal state, one per worker thread.
///
/// Nodes pushed during a query are stamped with the query's generation, so a node is never
/// pushed twice within one query and nothing needs clearing between queries.
#[derive(Clone, Debug, Default)]
pub struct StackCache {
    stack: Vec<NodeIdx>,
    visited: IndexVec<NodeIdx, u32>,
    generation: u32,
}

impl StackCache {
    fn begin(&mut self, node_count: usize) {
        debug_assert!(self.stack.is_empty());
        if self.visited.len() < node_count {
            self.visited.resize(node_count, 0);
        }

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.visited.iter_mut().for_each(|stamp| *stamp = 0);
            self.generation = 1;
        }
    }

    /// Returns false if the node was already pushed during this query.
    fn push(&mut self, node: NodeIdx) -> bool {
        let stamp = &mut self.visited[node];
        if *stamp == self.generation {
            return false;
        }
        *stamp = self.generation;
        self.stack.push(node);
        true
    }

    fn pop(&mut self) -> Option<NodeIdx> {
        self.stack.pop()
    }
}

/// Work counters of closest hit queries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub box_tests: usize,
    pub primitive_tests: usize,
    pub leaves_visited: usize,
}

impl QueryStats {
    /// Box and primitive intersection tests together.
    pub fn total_tests(&self) -> usize {
        self.box_tests + self.primitive_tests
    }
}

impl AddAssign for QueryStats {
    fn add_assign(&mut self, rhs: Self) {
        self.box_tests += rhs.box_tests;
        self.primitive_tests += rhs.primitive_tests;
        self.leaves_visited += rhs.leaves_visited;
    }
}

impl Bvh {
    /// Nearest primitive hit along the ray and its distance.
    /// `primitives` must be the list this hierarchy was built over.
    pub fn closest_hit(
        &self,
        primitives: &IndexSlice<PrimitiveIdx, [Primitive]>,
        ray: &Ray,
        stack: &mut StackCache,
        stats: &mut QueryStats,
    ) -> Option<(PrimitiveIdx, FloatType)> {
        if self.nodes.is_empty() {
            return None;
        }

        stack.begin(self.nodes.len());
        stack.push(Bvh::root());

        let mut best: Option<(PrimitiveIdx, FloatType)> = None;

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];

            stats.box_tests += 1;
            let Some(entry) = node.bounding_box.entry_distance(ray) else {
                continue;
            };
            if best.is_some_and(|(_, best_t)| entry > best_t) {
                // The node can't contain anything closer than what we already have
                continue;
            }

            match node.kind {
                NodeKind::Inner { left, right } => {
                    // Left is popped first
                    stack.push(right);
                    stack.push(left);
                }
                NodeKind::Leaf { first, count } => {
                    stats.leaves_visited += 1;
                    for i in first.index()..first.index() + count as usize {
                        let primitive_index = PrimitiveIdx::from_usize(i);
                        stats.primitive_tests += 1;
                        if let Some(t) = primitives[primitive_index].intersect(ray) {
                            if best.is_none_or(|(_, best_t)| t < best_t) {
                                best = Some((primitive_index, t));
                            }
                        }
                    }
                }
            }
        }

        best
    }
}
