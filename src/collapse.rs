//! Removal of non-branching internal nodes.
//!
//! Single-child nodes are artifacts of tree editing (e.g. taxon pruning) and
//! carry no topological information; collapsing reattaches each lone child to
//! its grandparent.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::TreeArena;
use crate::errors::PhyloResult;

/// Collapses all single-child internal nodes, returning how many were removed.
///
/// Runs to a fixed point: each pass scans every live node and removes those
/// with exactly one child; the loop halts when a full pass finds none.
/// Termination is guaranteed because every non-final pass strictly decreases
/// the node count. A single-child root is replaced by its child.
#[instrument(level = "debug", skip(tree))]
pub fn collapse_single_child_nodes(tree: &mut TreeArena) -> PhyloResult<usize> {
    let mut removed = 0;
    loop {
        let singles: Vec<Index> = tree
            .iter()
            .filter(|(_, node)| node.children.len() == 1)
            .map(|(idx, _)| idx)
            .collect();
        if singles.is_empty() {
            break;
        }
        debug!("collapsing {} single-child nodes", singles.len());
        for idx in singles {
            tree.splice_out(idx)?;
            removed += 1;
        }
    }
    Ok(removed)
}
