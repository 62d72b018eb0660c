//! Append-only roadmap tree stored as an arena
//!
//! Nodes refer to their parent by index, so the tree owns every node and a
//! child never owns its parent.

use ordered_float::NotNan;

use crate::planning::configuration::{ChangeLog, Configuration};
use crate::planning::heuristic::configuration_distance;

/// Stable index of a node in the roadmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Node of the roadmap tree
#[derive(Debug, Clone)]
pub struct RoadmapNode {
    pub configuration: Configuration,
    pub parent: Option<NodeId>,
    /// Move that produced this node from its parent, `None` for the root
    pub change: Option<ChangeLog>,
}

#[derive(Debug, Clone)]
pub struct RoadmapTree {
    nodes: Vec<RoadmapNode>,
}

impl RoadmapTree {
    pub fn new(root: Configuration) -> Self {
        RoadmapTree {
            nodes: vec![RoadmapNode {
                configuration: root,
                parent: None,
                change: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[RoadmapNode] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&RoadmapNode> {
        self.nodes.get(id.0)
    }

    pub fn configuration(&self, id: NodeId) -> Option<&Configuration> {
        self.get(id).map(|node| &node.configuration)
    }

    /// Add the child of `parent` reached by `change`. Returns `None` if
    /// `parent` is not in the tree.
    pub fn append(&mut self, parent: NodeId, change: ChangeLog) -> Option<NodeId> {
        let configuration = self.configuration(parent)?.with_change(&change);
        self.nodes.push(RoadmapNode {
            configuration,
            parent: Some(parent),
            change: Some(change),
        });
        Some(NodeId(self.nodes.len() - 1))
    }

    /// Closest node under `configuration_distance`, lowest index on ties.
    pub fn nearest(&self, configuration: &Configuration) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.configuration.is_compatible(configuration))
            .filter_map(|(i, node)| {
                NotNan::new(configuration_distance(&node.configuration, configuration))
                    .ok()
                    .map(|d| (i, d))
            })
            .min_by_key(|&(_, d)| d)
            .map(|(i, _)| NodeId(i))
    }

    /// Node ids from `leaf` up to and including the root
    pub fn path_to_root(&self, leaf: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut node_index = self.get(leaf).map(|_| leaf);

        while let Some(index) = node_index {
            path.push(index);
            node_index = self.nodes[index.0].parent;
        }

        path
    }

    /// Rebuild `leaf`'s configuration by replaying every move label from the root.
    pub fn replay(&self, leaf: NodeId) -> Option<Configuration> {
        let path = self.path_to_root(leaf);
        let root = path.last()?;
        let start = self.nodes[root.0].configuration.clone();
        Some(path.iter().rev().fold(start, |config, id| {
            match &self.nodes[id.0].change {
                Some(change) => config.with_change(change),
                None => config,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MovableBox, Point2D};
    use crate::planning::configuration::{Axis, Slot};

    fn root() -> Configuration {
        Configuration::new(
            vec![MovableBox::new(Point2D::new(0.1, 0.1), 0.1)],
            vec![MovableBox::new(Point2D::new(0.6, 0.6), 0.1)],
        )
    }

    #[test]
    fn test_append_and_replay() {
        let mut tree = RoadmapTree::new(root());
        let a = tree.append(tree.root(), ChangeLog::new(Slot::Box(0), Axis::X, 0.3)).unwrap();
        let b = tree.append(a, ChangeLog::new(Slot::Obstacle(0), Axis::Y, 0.2)).unwrap();
        let c = tree.append(b, ChangeLog::new(Slot::Box(0), Axis::Y, 0.4)).unwrap();

        assert_eq!(tree.path_to_root(c), vec![c, b, a, tree.root()]);
        assert_eq!(tree.replay(c).as_ref(), tree.configuration(c));
        assert_eq!(tree.configuration(c).unwrap().boxes()[0].position, Point2D::new(0.3, 0.4));
    }

    #[test]
    fn test_append_to_unknown_parent() {
        let mut tree = RoadmapTree::new(root());
        assert!(tree.append(NodeId(5), ChangeLog::new(Slot::Box(0), Axis::X, 0.3)).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_nearest_prefers_closest() {
        let mut tree = RoadmapTree::new(root());
        let far = tree.append(tree.root(), ChangeLog::new(Slot::Box(0), Axis::X, 0.8)).unwrap();
        let query = tree.configuration(far).unwrap().with_change(&ChangeLog::new(Slot::Box(0), Axis::Y, 0.15));
        assert_eq!(tree.nearest(&query), Some(far));
        assert_eq!(tree.nearest(&root()), Some(tree.root()));
    }

    #[test]
    fn test_nearest_skips_incompatible_layout() {
        let tree = RoadmapTree::new(root());
        let other = Configuration::new(Vec::new(), Vec::new());
        assert_eq!(tree.nearest(&other), None);
    }
}
