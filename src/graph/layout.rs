//! Tree layout for displaying stacks

use super::BranchGraph;
use crate::error::Result;
use std::fmt;

const FILLED_CIRCLE: char = '●';
const EMPTY_CIRCLE: char = '○';
const BOTTOM_LEFT_BOX: char = '└';
const LEFT_FORK_BOX: char = '├';
const VERTICAL_BOX: char = '│';
const HORIZONTAL_BOX: char = '─';

/// One branch line of a rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Branch name
    pub branch: String,
    /// Distance from the tree's top branch
    pub depth: usize,
    /// Vertical rails inherited from ancestors
    pub prefix: String,
    /// Fork glyphs joining this line to its parent
    pub connector: String,
    /// Prefix for detail lines printed under this branch
    pub gutter: String,
    /// Whether this is the checked out branch
    pub is_current: bool,
}

impl TreeLine {
    /// Node glyph
    pub const fn marker(&self) -> char {
        if self.is_current {
            FILLED_CIRCLE
        } else {
            EMPTY_CIRCLE
        }
    }
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{} {}",
            self.prefix,
            self.connector,
            self.marker(),
            self.branch
        )
    }
}

/// Lay out the subtree at `from` depth-first, children in name order
pub fn tree_lines(graph: &BranchGraph, from: &str, current: Option<&str>) -> Result<Vec<TreeLine>> {
    graph.branch(from)?;
    let mut lines = Vec::new();
    walk(graph, from, current, 0, true, "", "", &mut lines);
    Ok(lines)
}

#[allow(clippy::too_many_arguments)]
fn walk(
    graph: &BranchGraph,
    name: &str,
    current: Option<&str>,
    depth: usize,
    is_last: bool,
    prefix: &str,
    connector: &str,
    lines: &mut Vec<TreeLine>,
) {
    let child_prefix = if depth == 0 {
        prefix.to_string()
    } else if is_last {
        format!("{prefix}  ")
    } else {
        format!("{prefix}{VERTICAL_BOX} ")
    };
    let children = graph.children_of(name);
    let gutter = if children.is_empty() {
        format!("{child_prefix}  ")
    } else {
        format!("{child_prefix}{VERTICAL_BOX} ")
    };

    lines.push(TreeLine {
        branch: name.to_string(),
        depth,
        prefix: prefix.to_string(),
        connector: connector.to_string(),
        gutter,
        is_current: current == Some(name),
    });

    let mut iter = children.iter().peekable();
    while let Some(child) = iter.next() {
        let last_child = iter.peek().is_none();
        let fork = if last_child {
            BOTTOM_LEFT_BOX
        } else {
            LEFT_FORK_BOX
        };
        let connector = format!("{fork}{HORIZONTAL_BOX}");
        walk(
            graph,
            child,
            current,
            depth + 1,
            last_child,
            &child_prefix,
            &connector,
            lines,
        );
    }
}
