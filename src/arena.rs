use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::errors::{PhyloError, PhyloResult};

/// Data payload for one tree node.
#[derive(Debug, Clone, Default)]
pub struct NodeData {
    /// Tip label for leaves, non-numeric internal label otherwise
    pub label: Option<String>,
    /// Support value annotated on an internal node
    pub support: Option<f64>,
    /// Branch length to the parent
    pub branch_length: Option<f64>,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label.as_deref().unwrap_or(""))
    }
}

/// Tree node in the arena-based phylogeny structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in Newick order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based phylogenetic tree.
///
/// Uses a generational arena for stable node indices that survive removal of
/// other nodes. Each tree represents one parsed Newick topology.
#[derive(Debug, Default)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    /// Collects tip labels in left-to-right traversal order.
    ///
    /// Unlabeled leaves contribute an empty string.
    pub fn tip_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.data.label.clone().unwrap_or_default())
            .collect()
    }

    /// Removes a node, re-parenting its children to the node's own parent.
    ///
    /// The children take the removed node's position among its siblings, so
    /// traversal order is preserved. Removing the root is only valid when it
    /// has exactly one child, which then becomes the new root.
    #[instrument(level = "trace", skip(self))]
    pub fn splice_out(&mut self, idx: Index) -> PhyloResult<()> {
        let (parent, children) = {
            let node = self
                .arena
                .get(idx)
                .ok_or_else(|| PhyloError::TreeMutation("stale node index".to_string()))?;
            (node.parent, node.children.clone())
        };

        match parent {
            Some(parent_idx) => {
                for &child in &children {
                    let child_node = self.arena.get_mut(child).ok_or_else(|| {
                        PhyloError::TreeMutation("child index missing from arena".to_string())
                    })?;
                    child_node.parent = Some(parent_idx);
                }
                let parent_node = self.arena.get_mut(parent_idx).ok_or_else(|| {
                    PhyloError::TreeMutation("parent index missing from arena".to_string())
                })?;
                let pos = parent_node
                    .children
                    .iter()
                    .position(|&c| c == idx)
                    .ok_or_else(|| {
                        PhyloError::TreeMutation(
                            "node not registered in its parent's children".to_string(),
                        )
                    })?;
                parent_node.children.splice(pos..=pos, children);
            }
            None => {
                if children.len() != 1 {
                    return Err(PhyloError::TreeMutation(format!(
                        "cannot remove root with {} children",
                        children.len()
                    )));
                }
                let new_root = children[0];
                let child_node = self.arena.get_mut(new_root).ok_or_else(|| {
                    PhyloError::TreeMutation("child index missing from arena".to_string())
                })?;
                child_node.parent = None;
                self.root = Some(new_root);
            }
        }

        self.arena.remove(idx);
        Ok(())
    }

    /// Serializes the topology back to a Newick string.
    ///
    /// Internal supports are written as node labels; branch lengths are
    /// emitted when present.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.write_newick(root, &mut out);
        }
        out.push(';');
        out
    }

    fn write_newick(&self, idx: Index, out: &mut String) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        if !node.is_leaf() {
            out.push('(');
            for (i, &child) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.write_newick(child, out);
            }
            out.push(')');
            if let Some(support) = node.data.support {
                out.push_str(&format!("{}", support));
            }
        }
        if let Some(label) = &node.data.label {
            out.push_str(label);
        }
        if let Some(length) = node.data.branch_length {
            out.push_str(&format!(":{}", length));
        }
    }
}

pub struct TreeIterator<'a> {
    tree: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
