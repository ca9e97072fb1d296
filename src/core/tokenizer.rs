//! XML Tokenizer - State machine for XML token extraction
//!
//! Pull-parser style tokenizer that extracts XML tokens:
//! - Element start/end/empty tags
//! - Text content (references decoded)
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations (internal subset scanned for entity declarations)
//!
//! Every malformed construct is an error; there is no lenient mode.

use super::dtd::{parse_entity_decl, EntityTable};
use super::entities::{decode_text, find_invalid_char};
use super::scanner::{is_whitespace, Scanner};
use crate::error::ParseError;
use std::borrow::Cow;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// End of file
    Eof,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Offset of the first byte of the token
    pub start: usize,
    /// For tags: the element name
    pub name: Option<&'a str>,
    /// For tags: the raw attribute list between the name and `>` / `/>`
    pub attributes: Option<(usize, usize)>,
    /// For text: the content (owned only if references were decoded)
    pub content: Option<Cow<'a, str>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, start: usize) -> Self {
        Token {
            kind,
            start,
            name: None,
            attributes: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    fn with_attributes(mut self, start: usize, end: usize) -> Self {
        self.attributes = Some((start, end));
        self
    }

    fn with_content(mut self, content: Cow<'a, str>) -> Self {
        self.content = Some(content);
        self
    }
}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
    entities: EntityTable,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            scanner: Scanner::new(input.as_bytes()),
            entities: EntityTable::default(),
            done: false,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// General entities declared by the DOCTYPE seen so far
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// Build an error at `position` and stop the tokenizer
    fn fail(&mut self, message: &str, position: usize) -> ParseError {
        self.done = true;
        ParseError::new(message, self.input.as_bytes(), position)
    }

    /// Get the next token. After `Eof` or an error every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        let here = self.scanner.position();
        if self.done || self.scanner.is_eof() {
            self.done = true;
            return Ok(Token::new(TokenKind::Eof, here));
        }

        match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            _ => self.parse_text(),
        }
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => Err(self.fail("Unexpected end of input after '<'", start)),
        }
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail(
                "Invalid element name: must start with letter, underscore, or colon",
                name_start,
            ));
        }
        let name_end = self.scanner.position();

        // Find the end of the tag, handling quoted attributes
        let end = match self.scanner.find_tag_end_quoted() {
            Some(end) => end,
            None => return Err(self.fail("Unterminated start tag", start)),
        };

        let is_empty = self.scanner.slice(end - 1, end) == b"/";
        let attr_end = if is_empty { end - 1 } else { end };

        self.scanner.set_position(end + 1);

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(Token::new(kind, start)
            .with_name(&self.input[name_start..name_end])
            .with_attributes(name_end, attr_end))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'

        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail(
                "Invalid element name in end tag: must start with letter, underscore, or colon",
                name_start,
            ));
        }
        let name_end = self.scanner.position();

        // Only whitespace may follow the name
        self.scanner.skip_whitespace();
        match self.scanner.peek() {
            Some(b'>') => {}
            Some(_) => {
                let at = self.scanner.position();
                return Err(self.fail("End tag cannot have attributes or other content", at));
            }
            None => return Err(self.fail("Unterminated end tag", start)),
        }
        self.scanner.advance(1);

        Ok(Token::new(TokenKind::EndTag, start)
            .with_name(&self.input[name_start..name_end]))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.parse_comment(start)
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_cdata(start)
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            Err(self.fail("Invalid declaration - expected comment, CDATA, or DOCTYPE", start))
        }
    }

    /// Parse a comment <!--...-->
    fn parse_comment(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        let Some(end) = self.scanner.find_sequence(b"-->") else {
            return Err(self.fail("Unterminated comment", start));
        };
        let content = &self.input[content_start..end];

        if let Some(i) = content.find("--") {
            return Err(self.fail("Comment cannot contain '--'", content_start + i));
        }
        if let Some(i) = find_invalid_char(content) {
            return Err(self.fail("Invalid XML character in comment", content_start + i));
        }

        self.scanner.set_position(end + 3);
        Ok(Token::new(TokenKind::Comment, start))
    }

    /// Parse a CDATA section <![CDATA[...]]>
    fn parse_cdata(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        let Some(end) = self.scanner.find_sequence(b"]]>") else {
            return Err(self.fail("Unterminated CDATA section", start));
        };
        let content = &self.input[content_start..end];

        if let Some(i) = find_invalid_char(content) {
            return Err(self.fail("Invalid XML character in CDATA section", content_start + i));
        }

        self.scanner.set_position(end + 3);
        Ok(Token::new(TokenKind::CData, start))
    }

    /// Skip a DOCTYPE declaration, collecting the general entities its
    /// internal subset declares. Quoted literals and comments inside the
    /// subset may contain '>' and ']'.
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip 'DOCTYPE'
        let bytes = self.scanner.input();
        let mut pos = self.scanner.position();
        let mut in_subset = false;

        while pos < bytes.len() {
            match bytes[pos] {
                quote @ (b'"' | b'\'') => match memchr::memchr(quote, &bytes[pos + 1..]) {
                    Some(i) => pos += i + 2,
                    None => break,
                },
                b'<' if in_subset && bytes[pos..].starts_with(b"<!ENTITY") => {
                    let decl_start = pos + 8;
                    match parse_entity_decl(&self.input[decl_start..]) {
                        Ok(Some(decl)) => {
                            self.entities.declare(decl.name, decl.replacement);
                            pos = decl_start + decl.end;
                        }
                        Ok(None) => pos = decl_start,
                        Err((msg, i)) => return Err(self.fail(msg, decl_start + i)),
                    }
                }
                b'<' if in_subset && bytes[pos..].starts_with(b"<!--") => {
                    self.scanner.set_position(pos + 4);
                    match self.scanner.find_sequence(b"-->") {
                        Some(end) => pos = end + 3,
                        None => break,
                    }
                }
                b'[' if !in_subset => {
                    in_subset = true;
                    pos += 1;
                }
                b']' if in_subset => {
                    in_subset = false;
                    pos += 1;
                }
                b'>' if !in_subset => {
                    self.scanner.set_position(pos + 1);
                    return Ok(Token::new(TokenKind::DocType, start));
                }
                _ => pos += 1,
            }
        }

        Err(self.fail("Unterminated DOCTYPE declaration", start))
    }

    /// Parse a processing instruction or the XML declaration
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'

        let target_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail("Invalid processing instruction target", target_start));
        }
        let target_end = self.scanner.position();
        let target = &self.input[target_start..target_end];

        match self.scanner.peek() {
            Some(b) if is_whitespace(b) => {}
            Some(b'?') if self.scanner.starts_with(b"?>") => {}
            _ => {
                let at = self.scanner.position();
                return Err(self.fail("Invalid character after PI target name", at));
            }
        }

        let is_xml_decl = target == "xml";
        if !is_xml_decl && target.eq_ignore_ascii_case("xml") {
            return Err(self.fail(
                "Processing instruction target cannot be 'xml' (case-insensitive reserved name)",
                target_start,
            ));
        }
        if is_xml_decl && start != 0 {
            return Err(self.fail("XML declaration allowed only at the start of the document", start));
        }

        let Some(end) = self.scanner.find_sequence(b"?>") else {
            return Err(self.fail("Unterminated processing instruction", start));
        };
        if let Some(i) = find_invalid_char(&self.input[target_end..end]) {
            return Err(self.fail("Invalid XML character in processing instruction", target_end + i));
        }

        self.scanner.set_position(end + 2);
        let kind = if is_xml_decl { TokenKind::XmlDeclaration } else { TokenKind::ProcessingInstruction };
        Ok(Token::new(kind, start))
    }

    /// Parse text content up to the next '<'
    fn parse_text(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        let end = self.scanner.find_tag_start().unwrap_or(self.input.len());
        let content = &self.input[start..end];

        if let Some(i) = find_invalid_char(content) {
            return Err(self.fail("Invalid XML character in text content", start + i));
        }
        if let Some(i) = content.find("]]>") {
            return Err(self.fail("']]>' not allowed in text content", start + i));
        }

        let decoded = match decode_text(content, &self.entities) {
            Ok(decoded) => decoded,
            Err((msg, i)) => return Err(self.fail(msg, start + i)),
        };

        self.scanner.set_position(end);
        Ok(Token::new(TokenKind::Text, start).with_content(decoded))
    }
}
