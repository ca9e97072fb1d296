//! Whole-source reads
//!
//! Documents are parsed from memory, so every source is read to the end in
//! one blocking call before tokenizing starts.

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Read entire document from a Read source
pub fn read_all<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Read a file into memory; failures carry the path for display
pub fn read_path(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::source_io(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, ErrorKind};

    #[test]
    fn test_read_all() {
        let data = b"<root>content</root>";
        let result = read_all(Cursor::new(data.to_vec())).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_read_all_propagates_io_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::PermissionDenied, "denied"))
            }
        }
        assert_eq!(read_all(Broken).unwrap_err().kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_read_missing_path() {
        let err = read_path(Path::new("/no/such/file.xml")).unwrap_err();
        assert!(err.is_source());
        assert!(err.to_string().contains("/no/such/file.xml"));
    }

    #[test]
    fn test_read_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.vti");
        std::fs::write(&path, "<VTKFile/>").unwrap();
        assert_eq!(read_path(&path).unwrap(), b"<VTKFile/>");
    }
}
