//! Byte cursor over the decoded source
//!
//! The tokenizer drives a `Scanner` over the decoded source. All searches
//! go through memchr so long text runs and attribute lists are skipped
//! without a byte-at-a-time loop.

use memchr::{memchr, memchr3};

/// Cursor over the source bytes
pub struct Scanner<'a> {
    input: &'a [u8],
    cursor: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, cursor: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to the end of input
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.cursor = pos.min(self.input.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.cursor >= self.input.len()
    }

    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start..end]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.input.len());
    }

    /// Advance past XML whitespace
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.cursor += 1;
        }
    }

    /// Offset of the next '<' at or after the cursor
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', &self.input[self.cursor..]).map(|i| self.cursor + i)
    }

    /// Position of the '>' closing the current tag, skipping any '>' inside
    /// quoted attribute values.
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut pos = self.cursor;
        loop {
            let hit = pos + memchr3(b'>', b'"', b'\'', &self.input[pos..])?;
            match self.input[hit] {
                b'>' => return Some(hit),
                quote => {
                    let close = memchr(quote, &self.input[hit + 1..])?;
                    pos = hit + 1 + close + 1;
                }
            }
        }
    }

    /// Find the next occurrence of `needle` at or after the cursor
    pub fn find_sequence(&self, needle: &[u8]) -> Option<usize> {
        let first = *needle.first()?;
        let mut pos = self.cursor;
        while let Some(i) = memchr(first, &self.input[pos..]) {
            let at = pos + i;
            if self.input[at..].starts_with(needle) {
                return Some(at);
            }
            pos = at + 1;
        }
        None
    }

    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.cursor..].starts_with(needle)
    }

    /// Read an XML name at the cursor, advancing past it
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.cursor;
        let len = name_len_at(self.input, start);
        if len == 0 {
            return None;
        }
        self.cursor = start + len;
        Some(&self.input[start..self.cursor])
    }
}

/// Length of the XML name starting at `start`, or 0 when none starts there.
/// `bytes` must be UTF-8 and `start` a character boundary.
pub fn name_len_at(bytes: &[u8], start: usize) -> usize {
    let run = bytes[start..]
        .iter()
        .position(|&b| !is_name_byte(b))
        .unwrap_or(bytes.len() - start);
    // The run stops at an ASCII byte or the end, so it is whole characters
    std::str::from_utf8(&bytes[start..start + run]).map_or(0, name_len)
}

/// Length of the longest XML name prefix of `s`; 0 if `s` does not start with one
pub fn name_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_name_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !is_name_continue(c))
        .map_or(s.len(), |(i, _)| i)
}

/// Bytes that can appear inside a name; non-ASCII is checked per character later
#[inline]
fn is_name_byte(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

/// NameStartChar from XML 1.0 (fifth edition)
fn is_name_start(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z' | '_' | ':' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}' |
        '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_continue(c: char) -> bool {
    is_name_start(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_start_skips_text() {
        let scanner = Scanner::new(b"0 0.5 1 <DataArray>");
        assert_eq!(scanner.find_tag_start(), Some(8));
        assert_eq!(Scanner::new(b"no markup").find_tag_start(), None);
    }

    #[test]
    fn test_tag_end_ignores_quoted_gt() {
        let scanner = Scanner::new(b"<Piece Extent=\"0 > 1\">tail");
        assert_eq!(scanner.find_tag_end_quoted(), Some(21));
    }

    #[test]
    fn test_tag_end_mixed_quotes() {
        let scanner = Scanner::new(b"<a x='\">' y=\"'>'\">rest");
        assert_eq!(scanner.find_tag_end_quoted(), Some(17));
    }

    #[test]
    fn test_tag_end_open_quote() {
        assert_eq!(Scanner::new(b"<a x=\"oops>").find_tag_end_quoted(), None);
    }

    #[test]
    fn test_find_sequence_after_cursor() {
        let mut scanner = Scanner::new(b"<!-- a - b -- c -->");
        scanner.advance(4);
        assert_eq!(scanner.find_sequence(b"-->"), Some(16));
        assert_eq!(scanner.find_sequence(b"]]>"), None);
    }

    #[test]
    fn test_read_name_stops_at_delimiter() {
        let mut scanner = Scanner::new(b"xlink:href=");
        assert_eq!(scanner.read_name(), Some(&b"xlink:href"[..]));
        assert_eq!(scanner.peek(), Some(b'='));

        let mut scanner = Scanner::new(b"Cells");
        assert_eq!(scanner.read_name(), Some(&b"Cells"[..]));
        assert!(scanner.is_eof());
    }

    #[test]
    fn test_non_ascii_names() {
        let mut scanner = Scanner::new("Größe=".as_bytes());
        assert_eq!(scanner.read_name(), Some("Größe".as_bytes()));

        // U+00D7 is not a name character
        let mut scanner = Scanner::new("a×b".as_bytes());
        assert_eq!(scanner.read_name(), Some(&b"a"[..]));
        assert_eq!(Scanner::new("×".as_bytes()).read_name(), None);
        assert_eq!(name_len("·a"), 0);
        assert_eq!(name_len("a·b"), "a·b".len());
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut scanner = Scanner::new(b"9lives");
        assert_eq!(scanner.read_name(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_cursor_moves_are_clamped() {
        let mut scanner = Scanner::new(b"\r\n\t <a/>");
        scanner.skip_whitespace();
        assert_eq!(scanner.peek(), Some(b'<'));
        scanner.advance(100);
        assert!(scanner.is_eof());
        scanner.set_position(2);
        assert_eq!(scanner.position(), 2);
    }
}
