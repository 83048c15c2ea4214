//! Newick parser producing an arena-based tree.
//!
//! Supports the standard grammar: nested parentheses, comma-separated
//! children, leaf labels, internal-node labels (numeric labels are stored as
//! support values), optional `:length` branch lengths, and square-bracket
//! comments. Trailing content after the terminating `;` is rejected.

use generational_arena::Index;
use tracing::instrument;

use crate::arena::{NodeData, TreeArena};
use crate::errors::{PhyloError, PhyloResult};

/// Characters that terminate an unquoted Newick label.
const LABEL_DELIMITERS: &[u8] = b"(),:;[]";

/// Parses a single Newick string into a [TreeArena].
#[instrument(level = "debug", skip(input))]
pub fn parse(input: &str) -> PhyloResult<TreeArena> {
    let mut parser = NewickParser::new(input);
    parser.parse()
}

struct NewickParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> NewickParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn parse(&mut self) -> PhyloResult<TreeArena> {
        let mut tree = TreeArena::new();

        self.skip_filler();
        if self.peek().is_none() {
            return Err(self.error("empty input"));
        }
        self.parse_subtree(&mut tree, None)?;
        self.skip_filler();
        match self.peek() {
            Some(b';') => {
                self.pos += 1;
            }
            _ => return Err(self.error("expected ';'")),
        }
        self.skip_filler();
        if self.peek().is_some() {
            return Err(self.error("trailing content after ';'"));
        }

        Ok(tree)
    }

    fn parse_subtree(&mut self, tree: &mut TreeArena, parent: Option<Index>) -> PhyloResult<Index> {
        self.skip_filler();
        let idx = if self.peek() == Some(b'(') {
            // Internal node: children first, then an optional label
            let idx = tree.insert_node(NodeData::default(), parent);
            self.pos += 1;
            loop {
                self.parse_subtree(tree, Some(idx))?;
                self.skip_filler();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                    }
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ')'")),
                }
            }
            let label = self.read_label();
            if !label.is_empty() {
                let node = tree
                    .get_node_mut(idx)
                    .ok_or_else(|| PhyloError::TreeMutation("stale node index".to_string()))?;
                // Numeric internal labels carry support values
                match label.parse::<f64>() {
                    Ok(support) => node.data.support = Some(support),
                    Err(_) => node.data.label = Some(label),
                }
            }
            idx
        } else {
            let label = self.read_label();
            if label.is_empty() {
                return Err(self.error("expected leaf label or '('"));
            }
            tree.insert_node(
                NodeData {
                    label: Some(label),
                    ..NodeData::default()
                },
                parent,
            )
        };

        self.skip_filler();
        if self.peek() == Some(b':') {
            self.pos += 1;
            let length = self.read_number()?;
            let node = tree
                .get_node_mut(idx)
                .ok_or_else(|| PhyloError::TreeMutation("stale node index".to_string()))?;
            node.data.branch_length = Some(length);
        }

        Ok(idx)
    }

    fn read_label(&mut self) -> String {
        self.skip_filler();
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || LABEL_DELIMITERS.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn read_number(&mut self) -> PhyloResult<f64> {
        self.skip_filler();
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;
        text.parse::<f64>()
            .map_err(|_| self.error("invalid branch length"))
    }

    /// Skips whitespace and `[...]` comments.
    fn skip_filler(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'[') => {
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b']' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, reason: &str) -> PhyloError {
        PhyloError::InvalidNewick {
            position: self.pos,
            reason: reason.to_string(),
        }
    }
}
