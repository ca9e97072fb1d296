//! XML Entity Decoding
//!
//! Handles the references a well-formed standalone document may use:
//! - Predefined entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - General entities declared in the internal DTD subset
//!
//! Anything else is an undefined entity and fails the parse.
//! Uses Cow for zero-copy when no references are present.

use super::dtd::EntityTable;
use memchr::{memchr, memchr2};
use std::borrow::Cow;

/// Declared entities may nest at most this deep
const MAX_ENTITY_DEPTH: usize = 16;
/// Total bytes of declared replacement text one value may pull in
const MAX_EXPANSION: usize = 1 << 20;

/// Decode character data.
///
/// On failure returns the message and the offset of the offending '&'.
pub fn decode_text<'s>(
    input: &'s str,
    entities: &EntityTable,
) -> Result<Cow<'s, str>, (&'static str, usize)> {
    decode(input, entities, false)
}

/// Decode an attribute value whose literal whitespace is already normalized.
/// Whitespace arriving through declared entities is normalized here.
pub fn decode_attribute<'s>(
    input: &'s str,
    entities: &EntityTable,
) -> Result<Cow<'s, str>, (&'static str, usize)> {
    decode(input, entities, true)
}

fn decode<'s>(
    input: &'s str,
    entities: &EntityTable,
    in_attribute: bool,
) -> Result<Cow<'s, str>, (&'static str, usize)> {
    // Fast path: no references at all
    if memchr(b'&', input.as_bytes()).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    let mut out = String::with_capacity(input.len());
    let mut expander = Expander {
        entities,
        in_attribute,
        budget: MAX_EXPANSION,
    };
    expander.expand_into(&mut out, input, 0)?;
    Ok(Cow::Owned(out))
}

struct Expander<'t> {
    entities: &'t EntityTable,
    in_attribute: bool,
    budget: usize,
}

impl Expander<'_> {
    fn expand_into(&mut self, out: &mut String, input: &str, depth: usize) -> Result<(), (&'static str, usize)> {
        let bytes = input.as_bytes();
        let mut pos = 0;

        while let Some(offset) = memchr(b'&', &bytes[pos..]) {
            let amp = pos + offset;
            out.push_str(&input[pos..amp]);

            let semi = memchr(b';', &bytes[amp..])
                .map(|i| amp + i)
                .ok_or(("Entity reference is missing ';'", amp))?;
            let name = &input[amp + 1..semi];

            match decode_builtin(name) {
                Some(decoded) => out.push(decoded.map_err(|msg| (msg, amp))?),
                None => {
                    let entities = self.entities;
                    let replacement = entities.get(name).ok_or(("Undefined entity", amp))?;
                    if depth >= MAX_ENTITY_DEPTH {
                        return Err(("Entity references nested too deeply", amp));
                    }
                    self.budget = self
                        .budget
                        .checked_sub(replacement.len())
                        .ok_or(("Entity expansion limit exceeded", amp))?;

                    let text = if self.in_attribute {
                        if replacement.contains('<') {
                            return Err(("Attribute value cannot contain '<'", amp));
                        }
                        Cow::Owned(replacement.replace(&['\t', '\n', '\r'][..], " "))
                    } else {
                        Cow::Borrowed(replacement)
                    };
                    // Errors inside replacement text point at the outer reference
                    self.expand_into(out, &text, depth + 1)
                        .map_err(|(msg, _)| (msg, amp))?;
                }
            }
            pos = semi + 1;
        }

        out.push_str(&input[pos..]);
        Ok(())
    }
}

/// Predefined and numeric references; `None` for any other name
fn decode_builtin(entity: &str) -> Option<Result<char, &'static str>> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return Some(decode_numeric_entity(numeric));
    }

    match entity {
        "lt" => Some(Ok('<')),
        "gt" => Some(Ok('>')),
        "amp" => Some(Ok('&')),
        "quot" => Some(Ok('"')),
        "apos" => Some(Ok('\'')),
        "" => Some(Err("Empty entity reference")),
        _ => None,
    }
}

fn decode_numeric_entity(entity: &str) -> Result<char, &'static str> {
    let codepoint = match entity.strip_prefix('x') {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None if !entity.is_empty() && entity.bytes().all(|b| b.is_ascii_digit()) => {
            entity.parse::<u32>().ok()
        }
        None => None,
    }
    .ok_or("Invalid character reference")?;

    if !is_valid_xml_char(codepoint) {
        return Err("Character reference to a character not allowed in XML");
    }
    char::from_u32(codepoint).ok_or("Invalid character reference")
}

/// Replacement text of an entity declaration literal: character references
/// are expanded now, general entity references are kept for use time.
pub fn decode_entity_value(literal: &str) -> Result<String, (&'static str, usize)> {
    let bytes = literal.as_bytes();
    let mut out = String::with_capacity(literal.len());
    let mut pos = 0;

    while let Some(offset) = memchr2(b'&', b'%', &bytes[pos..]) {
        let at = pos + offset;
        if bytes[at] == b'%' {
            return Err(("Parameter entity reference not allowed in the internal subset", at));
        }
        let semi = memchr(b';', &bytes[at..])
            .map(|i| at + i)
            .ok_or(("Entity reference is missing ';'", at))?;

        match &literal[at + 1..semi] {
            "" => return Err(("Empty entity reference", at)),
            body => match body.strip_prefix('#') {
                Some(numeric) => {
                    out.push_str(&literal[pos..at]);
                    out.push(decode_numeric_entity(numeric).map_err(|msg| (msg, at))?);
                }
                None => out.push_str(&literal[pos..=semi]),
            },
        }
        pos = semi + 1;
    }

    out.push_str(&literal[pos..]);
    Ok(out)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Find the first character not allowed in XML 1.0 content.
///
/// Input is already valid UTF-8, so only the Char production is checked.
pub fn find_invalid_char(content: &str) -> Option<usize> {
    content
        .char_indices()
        .find(|&(_, c)| !is_valid_xml_char(c as u32))
        .map(|(i, _)| i)
}
