//! Stateful parse-then-summarize handle
//!
//! Holds a path and, after a successful `parse()`, the tree parsed from it.

use crate::error::{Error, Result};
use crate::summary::summarize;
use crate::tree::MarkupNode;
use std::path::{Path, PathBuf};

/// A markup file bound to a path
#[derive(Debug)]
pub struct MarkupFile {
    path: PathBuf,
    root: Option<MarkupNode>,
}

impl MarkupFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MarkupFile {
            path: path.into(),
            root: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed tree, if the last `parse()` succeeded
    pub fn root(&self) -> Option<&MarkupNode> {
        self.root.as_ref()
    }

    pub fn is_parsed(&self) -> bool {
        self.root.is_some()
    }

    /// Read and parse the file, replacing any earlier tree.
    ///
    /// A failure leaves the handle unparsed.
    pub fn parse(&mut self) -> Result<()> {
        self.root = None;
        self.root = Some(crate::parse_file(&self.path)?);
        Ok(())
    }

    /// Render the summary of the parsed tree
    pub fn summary(&self) -> Result<String> {
        self.root.as_ref().map(summarize).ok_or(Error::NotParsed)
    }
}
