//! Pull events
//!
//! What the tree builder sees of a document. Only elements and text carry a
//! payload; everything else has already been validated by the tokenizer and
//! only its position in the document matters.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent<'a> {
    /// `<name ...>`
    Open(Tag<'a>),
    /// `<name .../>`
    SelfClosed(Tag<'a>),
    /// `</name>`
    Close(&'a str),
    /// Character data, references decoded
    Text(Cow<'a, str>),
    /// A CDATA section
    CData,
    /// Comment, processing instruction or XML declaration
    Misc,
    DocType,
    EndDocument,
}

/// Name and attributes of an open or self-closed tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Qualified name as written (`xlink:href` keeps its prefix)
    pub name: &'a str,
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> Tag<'a> {
    pub fn new(name: &'a str, attributes: Vec<Attribute<'a>>) -> Self {
        Tag { name, attributes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_names_kept_verbatim() {
        let attrs = vec![Attribute::new("xlink:href", Cow::Borrowed("#a"))];
        let tag = Tag::new("svg:rect", attrs);
        assert_eq!(tag.name, "svg:rect");
        assert_eq!(tag.attributes[0].name, "xlink:href");
    }

    #[test]
    fn test_open_and_self_closed_differ() {
        let tag = Tag::new("Piece", vec![]);
        assert_ne!(XmlEvent::Open(tag.clone()), XmlEvent::SelfClosed(tag));
        assert_eq!(XmlEvent::Close("Piece"), XmlEvent::Close("Piece"));
    }
}
