use crate::util::Stats;

use super::{Bvh, NodeIdx, NodeKind};

impl Bvh {
    /// Dump the node hierarchy to the debug log.
    pub fn print_tree(&self) {
        if self.nodes.is_empty() {
            log::debug!("<empty BVH>");
            return;
        }
        self.print_recursive(0, Bvh::root());
    }

    pub fn print_statistics(&self) {
        if self.nodes.is_empty() {
            log::info!("BVH is empty");
            return;
        }
        let depth = self.depth_statistics_recursive(Bvh::root());
        let leaf = self.leaf_fill_statistics();
        log::info!("BVH nodes: {}", self.nodes.len());
        log::info!("BVH depth: {} - {}; avg {:.1}", depth.min, depth.max, depth.avg);
        log::info!("BVH leaf fill: {}", leaf);
    }

    /// Depth of each leaf, counting the leaf itself.
    fn depth_statistics_recursive(&self, index: NodeIdx) -> Stats {
        match self.nodes[index].kind {
            NodeKind::Leaf { .. } => Stats::new_single(1),
            NodeKind::Inner { left, right } => {
                let mut ret = self
                    .depth_statistics_recursive(left)
                    .merge(&self.depth_statistics_recursive(right));
                ret.min += 1;
                ret.max += 1;
                ret.avg += 1.0;
                ret
            }
        }
    }

    fn leaf_fill_statistics(&self) -> Stats {
        let mut stats = Stats::default();

        stats.add_samples(self.nodes.iter().filter_map(|node| match node.kind {
            NodeKind::Leaf { count, .. } => Some(count as usize),
            NodeKind::Inner { .. } => None,
        }));

        stats
    }

    fn print_recursive(&self, indent: usize, index: NodeIdx) {
        let node = &self.nodes[index];
        let prefix = "  ".repeat(indent);

        match node.kind {
            NodeKind::Leaf { first, count } => {
                log::debug!(
                    "{}- L{}: {:?}-{:?} primitives {}..{}",
                    prefix,
                    index.index(),
                    node.bounding_box.min,
                    node.bounding_box.max,
                    first.index(),
                    first.index() + count as usize,
                );
            }
            NodeKind::Inner { left, right } => {
                log::debug!(
                    "{}- I{}: {:?}-{:?}",
                    prefix,
                    index.index(),
                    node.bounding_box.min,
                    node.bounding_box.max,
                );
                self.print_recursive(indent + 1, left);
                self.print_recursive(indent + 1, right);
            }
        }
    }
}
