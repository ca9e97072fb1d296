//! markup-summary - strict XML parsing and structure summaries
//!
//! Turns a markup document (typically a VTK `.vti`/`.vtu` file) into an
//! indented outline of its elements and attributes for a read-only preview.
//!
//! Entry points:
//! A: In-memory parse (parse_str, parse_bytes)
//! B: Stream and file parse (parse_reader, parse_file)
//! C: Summary rendering (summarize, write_summary, SummaryLines)
//! D: Stateful handle (MarkupFile)
//! E: Info-pane preview with text/binary fallback (preview)
//! F: Parallel batch summaries (batch)

mod core;
mod reader;

pub mod batch;
pub mod error;
pub mod file;
pub mod preview;
pub mod summary;
pub mod tree;

use std::io::Read;
use std::path::Path;

pub use error::{Error, ParseError, Result};
pub use file::MarkupFile;
pub use preview::{format_size, preview_file, preview_path, Preview, PreviewConfig, PreviewKind};
pub use summary::{summarize, write_summary, SummaryLines};
pub use tree::MarkupNode;

// ============================================================================
// Strategy A: In-memory parse
// ============================================================================

/// Parse a document held as text
pub fn parse_str(input: &str) -> Result<MarkupNode> {
    Ok(tree::build_tree(input)?)
}

/// Parse raw document bytes (UTF-8, UTF-8 with BOM, UTF-16, or a declared
/// Latin-1/ASCII encoding)
pub fn parse_bytes(input: &[u8]) -> Result<MarkupNode> {
    let text = crate::core::encoding::decode_source(input)
        .map_err(|(msg, offset)| ParseError::new(msg, input, offset))?;
    parse_str(&text)
}

// ============================================================================
// Strategy B: Streams and files
// ============================================================================

/// Read a stream to the end, then parse it
pub fn parse_reader<R: Read>(source: R) -> Result<MarkupNode> {
    let bytes = reader::source::read_all(source).map_err(|e| Error::source_io("input stream", e))?;
    parse_bytes(&bytes)
}

/// Read a file, then parse it
pub fn parse_file(path: impl AsRef<Path>) -> Result<MarkupNode> {
    let bytes = reader::source::read_path(path.as_ref())?;
    parse_bytes(&bytes)
}

/// Parse a file and render its summary in one call
pub fn summarize_file(path: impl AsRef<Path>) -> Result<String> {
    parse_file(path).map(|root| summarize(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_str_and_summarize() {
        let root = parse_str("<root><child a=\"1\"/></root>").unwrap();
        assert_eq!(summarize(&root), "<root>\n  <child a=\"1\">\n  </child>\n</root>\n");
    }

    #[test]
    fn test_malformed_is_parse_failure() {
        let err = parse_str("<broken><unclosed></broken>").unwrap_err();
        assert!(err.is_parse());
        assert!(parse_str("<a><b></a>").unwrap_err().is_parse());
    }

    #[test]
    fn test_missing_file_is_source_failure() {
        let err = parse_file("/no/such/file.xml").unwrap_err();
        assert!(err.is_source());
        assert!(!err.is_parse());
    }

    #[test]
    fn test_parse_bytes_handles_bom_and_utf16() {
        let with_bom = [&[0xEF, 0xBB, 0xBF][..], &b"<a/>"[..]].concat();
        assert_eq!(parse_bytes(&with_bom).unwrap().tag, "a");

        let utf16: Vec<u8> = "<a b=\"é\"/>".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let root = parse_bytes(&[&[0xFF, 0xFE][..], &utf16[..]].concat()).unwrap();
        assert_eq!(root.attribute("b"), Some("é"));
    }

    #[test]
    fn test_parse_bytes_invalid_utf8() {
        let err = parse_bytes(b"<a>\xC3</a>").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Invalid UTF-8"));
    }

    #[test]
    fn test_parse_bytes_declared_encoding() {
        let root = parse_bytes(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a v=\"caf\xe9\"/>").unwrap();
        assert_eq!(root.attribute("v"), Some("caf\u{e9}"));

        let err = parse_bytes(b"<?xml version=\"1.0\" encoding=\"EBCDIC\"?><a/>").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Unsupported encoding: EBCDIC"));
    }

    #[test]
    fn test_parse_reader() {
        let root = parse_reader(Cursor::new(b"<VTKFile><Piece/></VTKFile>".to_vec())).unwrap();
        assert_eq!(root.node_count(), 2);
    }

    #[test]
    fn test_summarize_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.vtu");
        std::fs::write(&path, "<VTKFile type=\"UnstructuredGrid\"><Piece/></VTKFile>").unwrap();
        assert_eq!(
            summarize_file(&path).unwrap(),
            "<VTKFile type=\"UnstructuredGrid\">\n  <Piece>\n  </Piece>\n</VTKFile>\n"
        );
    }

    #[test]
    fn test_repeated_summaries_identical() {
        let input = "<a x=\"1\"><b y=\"2\"><c/></b></a>";
        assert_eq!(summarize(&parse_str(input).unwrap()), summarize(&parse_str(input).unwrap()));
    }
}
