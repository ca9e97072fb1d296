//! XML Attribute Parsing
//!
//! Parses the attribute list of a start tag (the bytes between the element
//! name and the closing `>` or `/>`). Only well-formed lists are accepted.

use super::dtd::EntityTable;
use super::entities::{decode_attribute, find_invalid_char};
use super::scanner::{is_whitespace, name_len_at};
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, verbatim (may include a namespace prefix)
    pub name: &'a str,
    /// Attribute value with references decoded and whitespace normalized
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: &'a str, value: Cow<'a, str>) -> Self {
        Attribute { name, value }
    }
}

/// Parse an attribute list, expanding references against `entities`.
///
/// On failure returns the message and the offset into `input` where the
/// problem was found.
pub fn parse_attributes<'s>(
    input: &'s str,
    entities: &EntityTable,
) -> Result<Vec<Attribute<'s>>, (&'static str, usize)> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        if pos == ws_start {
            return Err(("Attributes must be separated by whitespace", pos));
        }

        // Name
        let name_start = pos;
        let name_len = name_len_at(bytes, pos);
        if name_len == 0 {
            return Err(("Attribute name must start with letter, underscore, or colon", pos));
        }
        pos += name_len;
        let name = &input[name_start..pos];

        // Eq
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            return Err(("Attribute value required", pos));
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        // Quoted value
        let quote = match bytes.get(pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Err(("Attribute value must be quoted", pos)),
        };
        let value_start = pos + 1;
        let value_end = memchr::memchr(quote, &bytes[value_start..])
            .map(|i| value_start + i)
            .ok_or(("Attribute value has mismatched quotes", pos))?;
        let raw = &input[value_start..value_end];

        if let Some(i) = memchr::memchr(b'<', raw.as_bytes()) {
            return Err(("Attribute value cannot contain '<'", value_start + i));
        }
        if let Some(i) = find_invalid_char(raw) {
            return Err(("Invalid XML character in attribute value", value_start + i));
        }

        let value = decode_value(raw, entities).map_err(|(msg, i)| (msg, value_start + i))?;
        attrs.push(Attribute::new(name, value));
        pos = value_end + 1;
    }

    Ok(attrs)
}

/// Literal tab, newline and carriage return in a value become a single
/// space each (CRLF counts as one); character references are left intact.
fn decode_value<'s>(raw: &'s str, entities: &EntityTable) -> Result<Cow<'s, str>, (&'static str, usize)> {
    if !raw.bytes().any(|b| matches!(b, b'\t' | b'\n' | b'\r')) {
        return decode_attribute(raw, entities);
    }

    let normalized = raw.replace("\r\n", " ").replace(&['\t', '\n', '\r'][..], " ");
    // Offsets past a collapsed CRLF shift by one; close enough for a diagnostic
    decode_attribute(&normalized, entities).map(|v| Cow::Owned(v.into_owned()))
}

/// Find the first duplicated attribute name
pub fn find_duplicate<'a>(attrs: &[Attribute<'a>]) -> Option<&'a str> {
    attrs
        .iter()
        .enumerate()
        .find(|(i, a)| attrs[i + 1..].iter().any(|b| b.name == a.name))
        .map(|(_, a)| a.name)
}
