//! Tree figure generation.
//!
//! Reads a Newick file, collapses single-child nodes, lays the tree out as a
//! rectangular cladogram and writes an SVG. Canvas dimensions scale linearly
//! with taxon count so labels stay legible on large trees.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::TreeArena;
use crate::collapse::collapse_single_child_nodes;
use crate::errors::{PhyloError, PhyloResult};
use crate::newick;

const MIN_WIDTH: u32 = 2000;
const MIN_HEIGHT: u32 = 1000;
const WIDTH_PER_TAXON: u32 = 50;
const HEIGHT_PER_TAXON: u32 = 30;

const MARGIN: f64 = 50.0;
const LABEL_AREA: f64 = 250.0;
const NODE_SIZE: f64 = 30.0;

/// Configuration for one tree-rendering run.
#[derive(Debug, Clone)]
pub struct TreeJob {
    /// Newick input file
    pub infile: PathBuf,
    /// SVG output file
    pub outfile: PathBuf,
}

/// Runs one full rendering job and returns the number of tips drawn.
#[instrument(level = "debug")]
pub fn generate_tree_svg(job: &TreeJob) -> PhyloResult<usize> {
    if !job.infile.is_file() {
        return Err(PhyloError::FileNotFound(job.infile.clone()));
    }
    let input = fs::read_to_string(&job.infile)?;

    let mut tree = newick::parse(&input)?;
    let removed = collapse_single_child_nodes(&mut tree)?;
    debug!("collapsed {} single-child nodes", removed);

    let num_taxa = tree.tip_labels().len();
    let (width, height) = canvas_size(num_taxa);
    let svg = render_svg(&tree, width, height);

    fs::write(&job.outfile, svg)?;
    Ok(num_taxa)
}

/// Canvas dimensions for a given taxon count, with floors keeping small
/// trees readable.
pub fn canvas_size(num_taxa: usize) -> (u32, u32) {
    let n = num_taxa as u32;
    (
        MIN_WIDTH.max(n * WIDTH_PER_TAXON),
        MIN_HEIGHT.max(n * HEIGHT_PER_TAXON),
    )
}

/// Formats a support value for display: two decimals, blank when the value
/// is absent or zero.
pub fn format_support(support: Option<f64>) -> String {
    match support {
        Some(v) if v != 0.0 => format!("{:.2}", v),
        _ => String::new(),
    }
}

/// Renders the tree as a rectangular cladogram SVG document.
///
/// Tips occupy evenly spaced rows in traversal order and are right-aligned;
/// internal nodes sit at the mean row of their children, offset left by
/// their distance to the deepest descendant tip.
pub fn render_svg(tree: &TreeArena, width: u32, height: u32) -> String {
    let positions = layout(tree, f64::from(width), f64::from(height));

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );

    // Edges: vertical drop at the parent, then horizontal run to the child
    for (idx, node) in tree.iter() {
        let Some(&(x, y)) = positions.get(&idx) else {
            continue;
        };
        for &child in &node.children {
            if let Some(&(cx, cy)) = positions.get(&child) {
                let _ = writeln!(
                    svg,
                    r##"  <path d="M {x:.1} {y:.1} V {cy:.1} H {cx:.1}" fill="none" stroke="#262626" stroke-width="2"/>"##,
                );
            }
        }
    }

    // Nodes and labels
    for (idx, node) in tree.iter() {
        let Some(&(x, y)) = positions.get(&idx) else {
            continue;
        };
        let _ = writeln!(
            svg,
            r##"  <circle cx="{x:.1}" cy="{y:.1}" r="{r:.1}" fill="#e7e7e7" stroke="#262626"/>"##,
            r = NODE_SIZE / 2.0,
        );
        if node.is_leaf() {
            if let Some(label) = &node.data.label {
                let _ = writeln!(
                    svg,
                    r#"  <text x="{tx:.1}" y="{y:.1}" font-size="16" dominant-baseline="middle">{label}</text>"#,
                    tx = x + NODE_SIZE,
                    label = xml_escape(label),
                );
            }
        } else {
            let support = format_support(node.data.support);
            if !support.is_empty() {
                let _ = writeln!(
                    svg,
                    r#"  <text x="{x:.1}" y="{y:.1}" font-size="12" text-anchor="middle" dominant-baseline="middle">{support}</text>"#,
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Computes pixel positions for every node.
fn layout(tree: &TreeArena, width: f64, height: f64) -> HashMap<Index, (f64, f64)> {
    // Node height = edge count to the deepest descendant tip
    let mut node_heights: HashMap<Index, usize> = HashMap::new();
    let mut rows: HashMap<Index, f64> = HashMap::new();
    let mut next_row = 0usize;

    for (idx, node) in tree.iter_postorder() {
        if node.is_leaf() {
            node_heights.insert(idx, 0);
            rows.insert(idx, next_row as f64);
            next_row += 1;
        } else {
            let h = node
                .children
                .iter()
                .filter_map(|c| node_heights.get(c))
                .max()
                .copied()
                .unwrap_or(0);
            node_heights.insert(idx, h + 1);
            let child_rows: Vec<f64> = node
                .children
                .iter()
                .filter_map(|c| rows.get(c))
                .copied()
                .collect();
            let mean = child_rows.iter().sum::<f64>() / child_rows.len().max(1) as f64;
            rows.insert(idx, mean);
        }
    }

    let max_height = tree
        .root()
        .and_then(|r| node_heights.get(&r))
        .copied()
        .unwrap_or(0)
        .max(1) as f64;
    let num_rows = next_row.max(1) as f64;

    let plot_width = width - 2.0 * MARGIN - LABEL_AREA;
    let row_step = (height - 2.0 * MARGIN) / num_rows;

    let mut positions = HashMap::new();
    for (idx, h) in &node_heights {
        let x_unit = (max_height - *h as f64) / max_height;
        let x = MARGIN + x_unit * plot_width;
        let y = MARGIN + (rows[idx] + 0.5) * row_step;
        positions.insert(*idx, (x, y));
    }
    positions
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_small_tree_when_sizing_canvas_then_floors_apply() {
        assert_eq!(canvas_size(10), (2000, 1000));
    }

    #[test]
    fn given_large_tree_when_sizing_canvas_then_scales_linearly() {
        assert_eq!(canvas_size(100), (5000, 3000));
    }

    #[test]
    fn given_crossover_taxon_counts_when_sizing_canvas_then_dimensions_independent() {
        // height leaves its floor before width does
        assert_eq!(canvas_size(36), (2000, 1080));
        assert_eq!(canvas_size(41), (2050, 1230));
    }

    #[test]
    fn given_support_values_when_formatting_then_two_decimals_or_blank() {
        assert_eq!(format_support(Some(0.954)), "0.95");
        assert_eq!(format_support(Some(1.0)), "1.00");
        assert_eq!(format_support(Some(0.0)), "");
        assert_eq!(format_support(None), "");
    }

    #[test]
    fn given_tree_when_rendering_then_svg_contains_tips_and_supports() {
        let tree = crate::newick::parse("((A,B)0.95,C);").unwrap();

        let svg = render_svg(&tree, 2000, 1000);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="2000""#));
        assert!(svg.contains(">A</text>"));
        assert!(svg.contains(">C</text>"));
        assert!(svg.contains(">0.95</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn given_label_with_markup_when_rendering_then_escaped() {
        assert_eq!(xml_escape("a<b&c"), "a&lt;b&amp;c");
    }
}
