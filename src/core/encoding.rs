//! Source Encoding Detection
//!
//! VTK/XML files are almost always UTF-8, but editors on Windows still emit
//! a UTF-8 BOM or UTF-16 now and then. Without a BOM the `encoding`
//! named by the XML declaration is honoured for the single-byte encodings
//! below. Everything is normalized to a UTF-8 `String` before tokenizing.

use super::scanner::is_whitespace;
use memchr::memmem;
use std::borrow::Cow;

/// Failure message and the byte offset where decoding stopped
pub type DecodeError = (Cow<'static, str>, usize);

/// Encoding inferred from the first bytes of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

impl SourceEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xEF, 0xBB, 0xBF, ..] => SourceEncoding::Utf8Bom,
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => SourceEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => SourceEncoding::Utf16Be,
            _ => SourceEncoding::Utf8,
        }
    }

    fn bom_len(self, input: &[u8]) -> usize {
        match self {
            SourceEncoding::Utf8 => 0,
            SourceEncoding::Utf8Bom => 3,
            SourceEncoding::Utf16Le => usize::from(input.starts_with(&[0xFF, 0xFE])) * 2,
            SourceEncoding::Utf16Be => usize::from(input.starts_with(&[0xFE, 0xFF])) * 2,
        }
    }
}

/// Decode raw source bytes into UTF-8 text.
///
/// Plain UTF-8 and ASCII input is borrowed; everything else is copied.
pub fn decode_source(input: &[u8]) -> Result<Cow<'_, str>, DecodeError> {
    let encoding = SourceEncoding::detect(input);
    let bom = encoding.bom_len(input);
    let body = &input[bom..];

    match encoding {
        SourceEncoding::Utf8 => match declared_encoding(body) {
            Some((label, at)) => decode_declared(body, label, at),
            None => decode_utf8(body, 0),
        },
        // A BOM overrides the declaration
        SourceEncoding::Utf8Bom => decode_utf8(body, bom),
        SourceEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes).map(Cow::Owned),
        SourceEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes).map(Cow::Owned),
    }
}

fn decode_utf8(body: &[u8], bom: usize) -> Result<Cow<'_, str>, DecodeError> {
    std::str::from_utf8(body)
        .map(Cow::Borrowed)
        .map_err(|e| ("Invalid UTF-8 encoding".into(), bom + e.valid_up_to()))
}

/// Decode an 8-bit body by the encoding its declaration names
fn decode_declared<'s>(body: &'s [u8], label: &[u8], at: usize) -> Result<Cow<'s, str>, DecodeError> {
    match label.to_ascii_lowercase().as_slice() {
        b"utf-8" | b"utf8" => decode_utf8(body, 0),
        b"iso-8859-1" | b"iso8859-1" | b"iso_8859-1" | b"latin1" | b"latin-1" | b"l1" => {
            // Latin-1 bytes are the first 256 code points
            Ok(Cow::Owned(body.iter().map(|&b| char::from(b)).collect()))
        }
        b"us-ascii" | b"ascii" => match body.iter().position(|b| !b.is_ascii()) {
            Some(i) => Err(("Invalid US-ASCII byte".into(), i)),
            None => decode_utf8(body, 0),
        },
        b"utf-16" | b"utf-16le" | b"utf-16be" => {
            Err(("Document declares UTF-16 but is not UTF-16 encoded".into(), at))
        }
        _ => Err((
            format!("Unsupported encoding: {}", String::from_utf8_lossy(label)).into(),
            at,
        )),
    }
}

/// Value of the `encoding` pseudo-attribute of a leading XML declaration,
/// with its offset in `body`
fn declared_encoding(body: &[u8]) -> Option<(&[u8], usize)> {
    let rest = body.strip_prefix(b"<?xml")?;
    if !rest.first().is_some_and(|&b| is_whitespace(b)) {
        return None;
    }
    let decl = &rest[..memmem::find(rest, b"?>")?];

    let mut pos = memmem::find(decl, b"encoding")? + b"encoding".len();
    let skip = |mut pos: usize| {
        while decl.get(pos).is_some_and(|&b| is_whitespace(b)) {
            pos += 1;
        }
        pos
    };
    pos = skip(pos);
    if decl.get(pos) != Some(&b'=') {
        return None;
    }
    pos = skip(pos + 1);
    let quote = *decl.get(pos).filter(|&&q| q == b'"' || q == b'\'')?;
    let open = pos + 1;
    let close = open + memchr::memchr(quote, &decl[open..])?;

    // `rest` starts five bytes into `body`
    Some((&decl[open..close], 5 + open))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(("Invalid UTF-16: odd number of bytes".into(), bytes.len()));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units).map_err(|_| ("Invalid UTF-16: unpaired surrogate".into(), 0))
}
