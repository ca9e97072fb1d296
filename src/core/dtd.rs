//! Internal DTD subset: general entity declarations
//!
//! Only `<!ENTITY name "value">` is collected. Parameter entities and
//! external entities are skipped, so references to them stay undefined.

use super::entities::decode_entity_value;
use super::scanner::{is_whitespace, name_len_at};
use memchr::memchr;
use std::collections::HashMap;

/// General entities declared in the internal subset: name -> replacement text
#[derive(Debug, Default, Clone)]
pub struct EntityTable {
    entities: HashMap<String, String>,
}

impl EntityTable {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entities.get(name).map(String::as_str)
    }

    /// Record a declaration. The first declaration of a name wins.
    pub fn declare(&mut self, name: &str, replacement: String) {
        self.entities.entry(name.to_string()).or_insert(replacement);
    }
}

/// An internal general entity declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDecl<'a> {
    pub name: &'a str,
    pub replacement: String,
    /// Offset just past the closing quote of the literal
    pub end: usize,
}

/// Parse the text following `<!ENTITY`.
///
/// Returns `None` for declarations that are not collected (parameter or
/// external entities); the caller keeps scanning the subset past them.
pub fn parse_entity_decl(decl: &str) -> Result<Option<EntityDecl<'_>>, (&'static str, usize)> {
    let bytes = decl.as_bytes();
    let mut pos = skip_whitespace(bytes, 0);
    if pos == 0 {
        return Err(("Whitespace required after '<!ENTITY'", 0));
    }
    if bytes.get(pos) == Some(&b'%') {
        return Ok(None);
    }

    let name_len = name_len_at(bytes, pos);
    if name_len == 0 {
        return Err(("Invalid entity name", pos));
    }
    let name = &decl[pos..pos + name_len];
    pos += name_len;

    let after_name = skip_whitespace(bytes, pos);
    if after_name == pos {
        return Err(("Whitespace required after entity name", pos));
    }
    pos = after_name;

    let quote = match bytes.get(pos) {
        Some(&q @ (b'"' | b'\'')) => q,
        // SYSTEM or PUBLIC
        _ => return Ok(None),
    };
    let open = pos + 1;
    let close = memchr(quote, &bytes[open..])
        .map(|i| open + i)
        .ok_or(("Unterminated entity value", pos))?;
    let replacement = decode_entity_value(&decl[open..close]).map_err(|(msg, i)| (msg, open + i))?;

    Ok(Some(EntityDecl {
        name,
        replacement,
        end: close + 1,
    }))
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}
