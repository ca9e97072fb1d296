//! Markup tree representation
//!
//! Each node owns its children outright; there are no parent links and no
//! sharing, so a tree is dropped as soon as its summary has been produced.

/// One parsed element: tag, attributes in document order, child elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupNode {
    /// Element name, verbatim (never empty)
    pub tag: String,
    /// Attribute name/value pairs in document order; names are unique
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    pub fn new(tag: impl Into<String>) -> Self {
        MarkupNode {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    /// Get attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of nodes in the tree rooted here (including this one)
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Nesting depth of the tree rooted here; a leaf has depth 0
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, level)) = stack.pop() {
            max = max.max(level);
            stack.extend(node.children.iter().map(|c| (c, level + 1)));
        }
        max
    }
}

// Deeply nested documents would otherwise recurse once per level on drop
impl Drop for MarkupNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarkupNode {
        MarkupNode::new("VTKFile")
            .with_attribute("type", "ImageData")
            .with_child(
                MarkupNode::new("ImageData").with_child(
                    MarkupNode::new("Piece").with_child(MarkupNode::new("PointData")),
                ),
            )
            .with_child(MarkupNode::new("AppendedData"))
    }

    #[test]
    fn test_node_creation() {
        let node = MarkupNode::new("root");
        assert_eq!(node.tag, "root");
        assert!(node.children.is_empty());
        assert!(node.attributes.is_empty());
    }

    #[test]
    fn test_attribute_lookup() {
        let node = sample();
        assert_eq!(node.attribute("type"), Some("ImageData"));
        assert_eq!(node.attribute("version"), None);
    }

    #[test]
    fn test_counts() {
        let node = sample();
        assert_eq!(node.node_count(), 5);
        assert_eq!(node.depth(), 3);
        assert_eq!(MarkupNode::new("leaf").depth(), 0);
    }

    #[test]
    fn test_deep_tree_drops() {
        let mut node = MarkupNode::new("leaf");
        for _ in 0..200_000 {
            node = MarkupNode::new("n").with_child(node);
        }
        assert_eq!(node.children.len(), 1);
        drop(node);
    }
}
