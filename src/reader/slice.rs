//! Slice Reader
//!
//! Turns tokenizer output into pull events over an in-memory document.
//! Tag names and unescaped text borrow from the input.

use super::events::{Tag, XmlEvent};
use crate::core::attributes::{parse_attributes, Attribute};
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::ParseError;

/// XML reader over a decoded document
pub struct SliceReader<'a> {
    tokenizer: Tokenizer<'a>,
    /// Start of the token behind the most recent event
    last_start: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a str) -> Self {
        SliceReader {
            tokenizer: Tokenizer::new(input),
            last_start: 0,
        }
    }

    /// Offset of the markup that produced the last event
    pub fn last_start(&self) -> usize {
        self.last_start
    }

    /// Build an error located in this reader's input
    pub fn error_at(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError::new(message, self.tokenizer.input().as_bytes(), position)
    }

    /// Pull the next event; empty text runs are skipped
    pub fn next_event(&mut self) -> Result<XmlEvent<'a>, ParseError> {
        loop {
            let token = self.tokenizer.next_token()?;
            self.last_start = token.start;

            let event = match token.kind {
                TokenKind::Eof => XmlEvent::EndDocument,
                TokenKind::StartTag => XmlEvent::Open(self.tag(&token)?),
                TokenKind::EmptyTag => XmlEvent::SelfClosed(self.tag(&token)?),
                TokenKind::EndTag => XmlEvent::Close(token.name.unwrap_or_default()),
                TokenKind::Text => match token.content {
                    Some(content) if !content.is_empty() => XmlEvent::Text(content),
                    _ => continue,
                },
                TokenKind::CData => XmlEvent::CData,
                TokenKind::Comment | TokenKind::ProcessingInstruction | TokenKind::XmlDeclaration => {
                    XmlEvent::Misc
                }
                TokenKind::DocType => XmlEvent::DocType,
            };
            return Ok(event);
        }
    }

    fn tag(&self, token: &Token<'a>) -> Result<Tag<'a>, ParseError> {
        Ok(Tag::new(token.name.unwrap_or_default(), self.tag_attributes(token)?))
    }

    /// Parse the attribute list recorded on a tag token
    fn tag_attributes(&self, token: &Token<'a>) -> Result<Vec<Attribute<'a>>, ParseError> {
        let Some((start, end)) = token.attributes else {
            return Ok(Vec::new());
        };
        let input = self.tokenizer.input();
        parse_attributes(&input[start..end], self.tokenizer.entities())
            .map_err(|(msg, offset)| self.error_at(msg, start + offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<XmlEvent<'_>> {
        let mut reader = SliceReader::new(input);
        let mut events = Vec::new();
        loop {
            match reader.next_event().unwrap() {
                XmlEvent::EndDocument => return events,
                event => events.push(event),
            }
        }
    }

    #[test]
    fn test_open_text_close() {
        let events = events("<Piece>0 1 2</Piece>");
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], XmlEvent::Open(t) if t.name == "Piece"));
        assert!(matches!(&events[1], XmlEvent::Text(t) if t == "0 1 2"));
        assert_eq!(events[2], XmlEvent::Close("Piece"));
    }

    #[test]
    fn test_self_closed_with_attributes() {
        let events = events("<DataArray type=\"Float32\" Name=\"a\"/>");
        let XmlEvent::SelfClosed(tag) = &events[0] else {
            panic!("expected a self-closed tag, got {:?}", events[0]);
        };
        assert_eq!(tag.name, "DataArray");
        assert_eq!(tag.attributes[0].name, "type");
        assert_eq!(tag.attributes[0].value, "Float32");
        assert_eq!(tag.attributes[1].value, "a");
    }

    #[test]
    fn test_misc_markup() {
        let events = events("<?xml version=\"1.0\"?><!DOCTYPE a><a><!-- c --><?pi x?><![CDATA[raw]]></a>");
        assert_eq!(
            events.iter().filter(|e| matches!(e, XmlEvent::Misc)).count(),
            3
        );
        assert!(events.contains(&XmlEvent::DocType));
        assert!(events.contains(&XmlEvent::CData));
    }

    #[test]
    fn test_attribute_error_position() {
        let input = "<a>\n  <b x=1/>\n</a>";
        let mut reader = SliceReader::new(input);
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        let err = reader.next_event().unwrap_err();
        assert_eq!(err.message, "Attribute value must be quoted");
        assert_eq!((err.line, err.column), (2, 8));
    }

    #[test]
    fn test_last_start_tracks_markup() {
        let mut reader = SliceReader::new("<a><b/></a>");
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        assert_eq!(reader.last_start(), 3);
    }

    #[test]
    fn test_declared_entity_in_attribute() {
        let events = events("<!DOCTYPE a [<!ENTITY e \"hi\">]><a v=\"&e;!\"/>");
        let XmlEvent::SelfClosed(tag) = &events[1] else {
            panic!("expected a self-closed tag, got {:?}", events[1]);
        };
        assert_eq!(tag.attributes[0].value, "hi!");
    }

    #[test]
    fn test_end_document_repeats() {
        let mut reader = SliceReader::new("<a/>");
        reader.next_event().unwrap();
        assert_eq!(reader.next_event().unwrap(), XmlEvent::EndDocument);
        assert_eq!(reader.next_event().unwrap(), XmlEvent::EndDocument);
    }
}
