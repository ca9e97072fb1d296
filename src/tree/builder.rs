//! Tree builder
//!
//! Folds reader events into a `MarkupNode` tree with an explicit stack of
//! open elements, enforcing the document-level well-formedness rules the
//! tokenizer cannot see on its own (tag matching, single root, content
//! outside the root). Text, comments and PIs are validated but dropped.

use super::node::MarkupNode;
use crate::core::attributes::find_duplicate;
use crate::error::ParseError;
use crate::reader::events::{Tag, XmlEvent};
use crate::reader::slice::SliceReader;

/// Parse a decoded document into its root element
pub fn build_tree(input: &str) -> Result<MarkupNode, ParseError> {
    let mut reader = SliceReader::new(input);
    // Open elements, innermost last
    let mut stack: Vec<MarkupNode> = Vec::new();
    let mut root: Option<MarkupNode> = None;
    let mut seen_doctype = false;

    loop {
        let event = reader.next_event()?;
        let position = reader.last_start();

        match event {
            XmlEvent::Open(tag) | XmlEvent::SelfClosed(tag) if stack.is_empty() && root.is_some() => {
                return Err(reader.error_at(
                    format!("Document has multiple root elements: <{}>", tag.name),
                    position,
                ));
            }

            XmlEvent::Open(tag) => {
                stack.push(element_node(&reader, tag, position)?);
            }

            XmlEvent::SelfClosed(tag) => {
                let node = element_node(&reader, tag, position)?;
                attach(&mut stack, &mut root, node);
            }

            XmlEvent::Close(name) => {
                let Some(open) = stack.pop() else {
                    return Err(reader.error_at(
                        format!("Unexpected end tag: </{}> without matching start tag", name),
                        position,
                    ));
                };
                if open.tag != name {
                    return Err(reader.error_at(
                        format!("Tag mismatch: <{}> closed with </{}>", open.tag, name),
                        position,
                    ));
                }
                attach(&mut stack, &mut root, open);
            }

            XmlEvent::Text(content) => {
                if stack.is_empty() && !content.bytes().all(|b| b.is_ascii_whitespace()) {
                    let offset = content.bytes().take_while(u8::is_ascii_whitespace).count();
                    return Err(reader.error_at(
                        "Text content not allowed outside the root element",
                        position + offset,
                    ));
                }
            }

            XmlEvent::CData => {
                if stack.is_empty() {
                    return Err(reader.error_at(
                        "CDATA section not allowed outside the root element",
                        position,
                    ));
                }
            }

            XmlEvent::DocType => {
                if seen_doctype {
                    return Err(reader.error_at("Multiple DOCTYPE declarations not allowed", position));
                }
                if root.is_some() || !stack.is_empty() {
                    return Err(reader.error_at("DOCTYPE must come before root element", position));
                }
                seen_doctype = true;
            }

            XmlEvent::Misc => {}

            XmlEvent::EndDocument => break,
        }
    }

    if let Some(unclosed) = stack.last() {
        return Err(reader.error_at(format!("Unclosed tag: <{}>", unclosed.tag), input.len()));
    }
    root.ok_or_else(|| reader.error_at("No root element found", input.len()))
}

/// Convert a start tag into an owned node, rejecting duplicate attributes
fn element_node(
    reader: &SliceReader<'_>,
    tag: Tag<'_>,
    position: usize,
) -> Result<MarkupNode, ParseError> {
    if let Some(dup) = find_duplicate(&tag.attributes) {
        return Err(reader.error_at(format!("Duplicate attribute: {}", dup), position));
    }

    let mut node = MarkupNode::new(tag.name);
    node.attributes = tag
        .attributes
        .into_iter()
        .map(|a| (a.name.to_string(), a.value.into_owned()))
        .collect();
    Ok(node)
}

/// Hand a finished element to its parent, or make it the root
fn attach(stack: &mut [MarkupNode], root: &mut Option<MarkupNode>, node: MarkupNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(node: &MarkupNode) -> Vec<&str> {
        node.children.iter().map(|c| c.tag.as_str()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let root = build_tree("<root>hello</root>").unwrap();
        assert_eq!(root.tag, "root");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_parse_nested() {
        let root = build_tree("<a><b><c/></b><d/></a>").unwrap();
        assert_eq!(tags(&root), ["b", "d"]);
        assert_eq!(tags(&root.children[0]), ["c"]);
    }

    #[test]
    fn test_attributes_in_document_order() {
        let root = build_tree("<a y=\"2\" x=\"1\" b='&amp;'/>").unwrap();
        assert_eq!(
            root.attributes,
            [
                ("y".to_string(), "2".to_string()),
                ("x".to_string(), "1".to_string()),
                ("b".to_string(), "&".to_string()),
            ]
        );
    }

    #[test]
    fn test_prolog_and_misc_ignored() {
        let input = "<?xml version=\"1.0\"?>\n<!DOCTYPE VTKFile>\n<!-- c -->\n\
                     <VTKFile><?pi data?><![CDATA[raw]]><Piece/></VTKFile>\n<!-- trailing -->\n";
        let root = build_tree(input).unwrap();
        assert_eq!(root.tag, "VTKFile");
        assert_eq!(tags(&root), ["Piece"]);
    }

    #[test]
    fn test_tag_mismatch() {
        let err = build_tree("<a><b></a>").unwrap_err();
        assert_eq!(err.message, "Tag mismatch: <b> closed with </a>");
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_unclosed() {
        let err = build_tree("<broken><unclosed></broken>").unwrap_err();
        assert!(err.message.starts_with("Tag mismatch"));
        let err = build_tree("<a><b></b>").unwrap_err();
        assert_eq!(err.message, "Unclosed tag: <a>");
    }

    #[test]
    fn test_multiple_roots() {
        let err = build_tree("<a/><b/>").unwrap_err();
        assert!(err.message.starts_with("Document has multiple root elements"));
    }

    #[test]
    fn test_unexpected_end_tag() {
        assert!(build_tree("</a>").is_err());
    }

    #[test]
    fn test_no_root() {
        assert_eq!(build_tree("").unwrap_err().message, "No root element found");
        assert_eq!(build_tree("  <!-- only -->  ").unwrap_err().message, "No root element found");
    }

    #[test]
    fn test_text_outside_root() {
        let err = build_tree("<a/>\n junk").unwrap_err();
        assert_eq!(err.message, "Text content not allowed outside the root element");
        assert_eq!((err.line, err.column), (2, 2));
        assert!(build_tree("junk<a/>").is_err());
    }

    #[test]
    fn test_doctype_rules() {
        assert!(build_tree("<a/><!DOCTYPE a>").is_err());
        assert!(build_tree("<!DOCTYPE a><!DOCTYPE a><a/>").is_err());
    }

    #[test]
    fn test_internal_subset_entities() {
        let input = "<!DOCTYPE VTKFile [\n  <!ENTITY kind \"ImageData\">\n]>\n\
                     <VTKFile type=\"&kind;\">&kind;<Piece/></VTKFile>";
        let root = build_tree(input).unwrap();
        assert_eq!(root.attribute("type"), Some("ImageData"));
        assert_eq!(tags(&root), ["Piece"]);

        // Markup in replacement text stays character data
        let root = build_tree("<!DOCTYPE a [<!ENTITY b \"&#60;b/>\">]><a>&b;</a>").unwrap();
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_undeclared_entity_with_doctype() {
        let err = build_tree("<!DOCTYPE a [<!ENTITY e \"x\">]><a v=\"&f;\"/>").unwrap_err();
        assert_eq!(err.message, "Undefined entity");
        assert_eq!(err.position, 36);
    }

    #[test]
    fn test_name_characters() {
        let root = build_tree("<Größe Maß=\"1\"/>").unwrap();
        assert_eq!(root.tag, "Größe");
        assert_eq!(root.attribute("Maß"), Some("1"));
        assert!(build_tree("<a×></a×>").is_err());
        assert!(build_tree("<×/>").is_err());
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = build_tree("<a x=\"1\" x=\"2\"/>").unwrap_err();
        assert_eq!(err.message, "Duplicate attribute: x");
    }

    #[test]
    fn test_deep_nesting_is_iterative() {
        let depth = 100_000;
        let input = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let root = build_tree(&input).unwrap();
        assert_eq!(root.depth(), depth - 1);
    }
}
