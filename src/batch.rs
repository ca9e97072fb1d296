//! Parallel batch summaries
//!
//! Uses Rayon to parse and summarize many files at once. Each path gets its
//! own tree; nothing is shared between workers.

use crate::error::Result;
use crate::summarize_file;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Summarize every path in parallel; results keep the input order
pub fn summarize_paths<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<Result<String>> {
    debug!(count = paths.len(), "summarizing batch");
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = summarize_file(path);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "summary failed");
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_batch_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..16)
            .map(|i| {
                let path = dir.path().join(format!("piece{}.vtu", i));
                fs::write(&path, format!("<Piece{}/>", i)).unwrap();
                path
            })
            .collect();

        let results = summarize_paths(&paths);
        assert_eq!(results.len(), 16);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap(), &format!("<Piece{0}>\n</Piece{0}>\n", i));
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.xml");
        let bad = dir.path().join("bad.xml");
        fs::write(&good, "<ok/>").unwrap();
        fs::write(&bad, "<a><b></a>").unwrap();
        let missing = dir.path().join("missing.xml");

        let results = summarize_paths(&[&good, &bad, &missing]);
        assert_eq!(results[0].as_ref().unwrap(), "<ok>\n</ok>\n");
        assert!(results[1].as_ref().unwrap_err().is_parse());
        assert!(results[2].as_ref().unwrap_err().is_source());
    }

    #[test]
    fn test_empty_batch() {
        let paths: [&str; 0] = [];
        assert!(summarize_paths(&paths).is_empty());
    }
}
