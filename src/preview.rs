//! Info-pane preview text
//!
//! Builds the read-only text shown for a selected file: a metadata header,
//! then either the structure summary (markup files), a binary notice, or
//! the leading text of the file. Every outcome, failures included, is
//! rendered as text so the pane always has something to show.

use crate::summarize_file;
use chrono::{DateTime, Local};
use memchr::memchr;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What the preview routes as markup, and how much of other files it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Extensions (without the dot) summarized as markup; matched case-insensitively
    pub markup_extensions: Vec<String>,
    /// Leading bytes inspected for a NUL before treating a file as text
    pub sniff_bytes: usize,
    /// Characters of text shown before truncating
    pub max_chars: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            markup_extensions: vec!["xml".into(), "vti".into(), "vtu".into()],
            sniff_bytes: 2048,
            max_chars: 50_000,
        }
    }
}

impl PreviewConfig {
    pub fn with_markup_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markup_extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_sniff_bytes(mut self, sniff_bytes: usize) -> Self {
        self.sniff_bytes = sniff_bytes;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Whether `path` is routed to the structure summary
    pub fn is_markup(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.markup_extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }
}

/// Human readable size: whole bytes, then one decimal per 1024 step
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    for unit in ["KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// Which branch produced a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    NoSelection,
    NotFound,
    Summary,
    ParseFailed,
    Binary,
    Text,
    ReadFailed,
}

impl PreviewKind {
    /// The file could not be shown: missing, unreadable, or malformed markup
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            PreviewKind::NotFound | PreviewKind::ParseFailed | PreviewKind::ReadFailed
        )
    }
}

/// Rendered preview text and how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub kind: PreviewKind,
    pub text: String,
}

impl Preview {
    fn new(kind: PreviewKind, text: String) -> Self {
        Preview { kind, text }
    }
}

/// Preview text for `path`; never fails
pub fn preview_path(path: impl AsRef<Path>, config: &PreviewConfig) -> String {
    preview_file(path, config).text
}

/// Build the preview for `path`, keeping track of which branch produced it
pub fn preview_file(path: impl AsRef<Path>, config: &PreviewConfig) -> Preview {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Preview::new(PreviewKind::NoSelection, "No file selected".to_string());
    }
    if !path.exists() {
        debug!(path = %path.display(), "preview target missing");
        return Preview::new(PreviewKind::NotFound, format!("File not found: {}", path.display()));
    }

    match build_preview(path, config) {
        Ok(preview) => preview,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "preview read failed");
            Preview::new(
                PreviewKind::ReadFailed,
                format!("Failed to read file: {}\nError: {}", path.display(), e),
            )
        }
    }
}

fn build_preview(path: &Path, config: &PreviewConfig) -> io::Result<Preview> {
    let metadata = fs::metadata(path)?;
    let modified: DateTime<Local> = metadata.modified()?.into();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()));

    let mut lines = vec![
        format!("File: {}", path.display()),
        format!("Size: {}", format_size(metadata.len())),
        format!("Modified: {}", modified.format(MODIFIED_FORMAT)),
        format!("Type: {}", ext.as_deref().unwrap_or("(none)")),
        String::new(),
    ];

    if config.is_markup(path) {
        debug!(path = %path.display(), "previewing as markup");
        let (kind, body) = match summarize_file(path) {
            Ok(summary) => (PreviewKind::Summary, format!("XML Structure Summary:\n\n{}", summary)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "markup summary failed");
                (PreviewKind::ParseFailed, format!("Failed to parse XML: {}", e))
            }
        };
        lines.push(body);
        return Ok(Preview::new(kind, lines.join("\n")));
    }

    if is_binary(path, config.sniff_bytes)? {
        debug!(path = %path.display(), "previewing as binary");
        lines.push("Binary or non-text file; contents omitted.".to_string());
        return Ok(Preview::new(PreviewKind::Binary, lines.join("\n")));
    }

    let (text, truncated) = read_text(path, config.max_chars)?;
    debug!(path = %path.display(), chars = config.max_chars, truncated, "previewing as text");
    if truncated {
        lines.push(format!("(truncated to {} chars)", config.max_chars));
    }
    lines.push(String::new());
    let mut out = lines.join("\n");
    out.push_str(&text);
    Ok(Preview::new(PreviewKind::Text, out))
}

/// A NUL in the leading bytes marks the file as binary
fn is_binary(path: &Path, sniff_bytes: usize) -> io::Result<bool> {
    let mut chunk = Vec::new();
    File::open(path)?
        .take(sniff_bytes as u64)
        .read_to_end(&mut chunk)?;
    Ok(memchr(0, &chunk).is_some())
}

/// Leading `max_chars` characters, decoded lossily with line endings
/// normalized to `\n`, plus whether more followed
fn read_text(path: &Path, max_chars: usize) -> io::Result<(String, bool)> {
    // At most 4 bytes per char, so this always holds one char past the limit
    let limit = (max_chars as u64).saturating_add(1).saturating_mul(4);
    let mut bytes = Vec::new();
    File::open(path)?.take(limit).read_to_end(&mut bytes)?;

    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if memchr(b'\r', text.as_bytes()).is_some() {
        text = text.replace("\r\n", "\n").replace('\r', "\n");
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Ok((text[..cut].to_string(), true)),
        None => Ok((text, false)),
    }
}
