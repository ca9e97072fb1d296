//! Structure summary rendering
//!
//! Renders a `MarkupNode` tree as indented open/close tag lines:
//!
//! ```text
//! <root>
//!   <child a="1">
//!   </child>
//! </root>
//! ```
//!
//! One open line and one close line per node, two spaces of indent per
//! level, attributes in document order. Empty elements are never collapsed
//! to `<tag/>`. Values are written as decoded, without re-escaping.
//!
//! Names are not namespace-resolved. A prefixed tag renders as written
//! (`<svg:rect>`), not in ElementTree's `{uri}rect` form, and `xmlns` /
//! `xmlns:*` declarations stay in the attribute list instead of being
//! dropped.

use crate::tree::MarkupNode;
use std::fmt;

const INDENT: &str = "  ";

enum Frame<'a> {
    Open(&'a MarkupNode, usize),
    Close(&'a MarkupNode, usize),
}

/// Lazy pre-order iterator over summary lines (without line terminators).
///
/// Driven by an explicit stack, so nesting depth never touches the call
/// stack. Each iterator is single-pass; ask the node for a new one to start
/// over.
pub struct SummaryLines<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> SummaryLines<'a> {
    pub fn new(root: &'a MarkupNode) -> Self {
        SummaryLines {
            stack: vec![Frame::Open(root, 0)],
        }
    }
}

impl<'a> Iterator for SummaryLines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.stack.pop()? {
            Frame::Open(node, level) => {
                self.stack.push(Frame::Close(node, level));
                self.stack
                    .extend(node.children.iter().rev().map(|child| Frame::Open(child, level + 1)));
                Some(open_line(node, level))
            }
            Frame::Close(node, level) => Some(format!("{}</{}>", INDENT.repeat(level), node.tag)),
        }
    }
}

fn open_line(node: &MarkupNode, level: usize) -> String {
    let mut line = INDENT.repeat(level);
    line.push('<');
    line.push_str(&node.tag);
    for (name, value) in &node.attributes {
        line.push(' ');
        line.push_str(name);
        line.push_str("=\"");
        line.push_str(value);
        line.push('"');
    }
    line.push('>');
    line
}

impl MarkupNode {
    /// Summary lines for the tree rooted here
    pub fn summary_lines(&self) -> SummaryLines<'_> {
        SummaryLines::new(self)
    }
}

/// Render the full summary; every line ends with `\n`
pub fn summarize(node: &MarkupNode) -> String {
    let mut out = String::new();
    for line in node.summary_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Stream the summary into any formatter sink
pub fn write_summary<W: fmt::Write>(node: &MarkupNode, out: &mut W) -> fmt::Result {
    for line in node.summary_lines() {
        out.write_str(&line)?;
        out.write_char('\n')?;
    }
    Ok(())
}

impl fmt::Display for MarkupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(self, f)
    }
}
