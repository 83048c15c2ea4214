//! Phylogenetics batch utilities.
//!
//! Two independent pipelines:
//! * FASTA concatenation: merges per-gene alignment files keyed by species
//!   identifier into a single combined alignment
//!   ([`aggregate::concatenate`]).
//! * Tree rendering: reads a Newick tree, collapses single-child internal
//!   nodes and writes an SVG figure with support-value labels
//!   ([`render::generate_tree_svg`]).

pub mod aggregate;
pub mod arena;
pub mod cli;
pub mod collapse;
pub mod errors;
pub mod fasta;
pub mod newick;
pub mod render;
pub mod util;

pub use aggregate::{concatenate, ConcatJob};
pub use errors::{PhyloError, PhyloResult};
pub use render::{generate_tree_svg, TreeJob};
