use glam::Mat4;
use sunday_core::{math::mat4_from_row_major, scene::ImportedNode};

/// Snapshot of the imported node tree used to compose bone transforms.
///
/// Keeps every node, not only bones: helper and pivot nodes sit between bones
/// and their transforms are part of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub name: String,
    /// Bind pose transform relative to the parent.
    pub transformation: Mat4,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transformation: Mat4) -> Self {
        Self {
            name: name.into(),
            transformation,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: HierarchyNode) -> Self {
        self.children.push(child);
        self
    }

    /// Copies an imported subtree depth-first, children in source order.
    #[must_use]
    pub fn from_imported(src: &ImportedNode) -> Self {
        Self {
            name: src.name.clone(),
            transformation: mat4_from_row_major(&src.transformation),
            children: src.children.iter().map(Self::from_imported).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(HierarchyNode::node_count).sum::<usize>()
    }

    /// Depth-first search by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&HierarchyNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}
