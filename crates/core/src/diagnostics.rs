//! Optional record of every rewrite decision
//!
//! Nothing is written unless a [`FileSink`] is installed; the default
//! [`NoopSink`] discards everything.

use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Environment variable that turns the rewrite log on when set to `1`
pub const LOGGING_ENV_VAR: &str = "VENDORIZE_LOGGING";

/// Default log file name, relative to the project root
pub const DEFAULT_LOG_FILE: &str = "import_rewrites.log";

/// Classification of a single rewrite decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewriteTag {
    ConsumerImport,
    ConsumerFromImport,
    SamePackageSubmodule,
    SamePackageSelf,
    SamePackageInitTransform,
    SamePackageInitCircular,
    SamePackageFromImport,
    CrossPackageImport,
    CrossPackageFromImport,
    RenameAlias,
    StarImport,
    DynamicImport,
    Patch,
    HookTransform,
}

impl RewriteTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteTag::ConsumerImport => "CONSUMER_IMPORT",
            RewriteTag::ConsumerFromImport => "CONSUMER_FROM_IMPORT",
            RewriteTag::SamePackageSubmodule => "SAME_PACKAGE_SUBMODULE",
            RewriteTag::SamePackageSelf => "SAME_PACKAGE_SELF",
            RewriteTag::SamePackageInitTransform => "SAME_PACKAGE_INIT_TRANSFORM",
            RewriteTag::SamePackageInitCircular => "SAME_PACKAGE_INIT_CIRCULAR",
            RewriteTag::SamePackageFromImport => "SAME_PACKAGE_FROM_IMPORT",
            RewriteTag::CrossPackageImport => "CROSS_PACKAGE_IMPORT",
            RewriteTag::CrossPackageFromImport => "CROSS_PACKAGE_FROM_IMPORT",
            RewriteTag::RenameAlias => "RENAME_ALIAS",
            RewriteTag::StarImport => "STAR_IMPORT",
            RewriteTag::DynamicImport => "DYNAMIC_IMPORT",
            RewriteTag::Patch => "PATCH",
            RewriteTag::HookTransform => "HOOK_TRANSFORM",
        }
    }

    /// Whether the tagged statement was left as it was
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            RewriteTag::SamePackageInitCircular | RewriteTag::StarImport | RewriteTag::DynamicImport
        )
    }
}

impl fmt::Display for RewriteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteLogEntry {
    pub file: PathBuf,
    pub line: usize,
    pub original: String,
    pub replacement: Vec<String>,
    pub tag: RewriteTag,
}

pub trait DiagnosticSink {
    fn record(&mut self, entry: &RewriteLogEntry);

    fn file_diff(&mut self, path: &Path, before: &str, after: &str);

    fn note(&mut self, message: &str);
}

/// Sink used when logging is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&mut self, _entry: &RewriteLogEntry) {}

    fn file_diff(&mut self, _path: &Path, _before: &str, _after: &str) {}

    fn note(&mut self, _message: &str) {}
}

/// Plain-text log file with one block per decision and a unified diff per
/// changed file
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_block(&mut self, block: &str) {
        if let Err(e) = self
            .writer
            .write_all(block.as_bytes())
            .and_then(|_| self.writer.flush())
        {
            tracing::warn!("Failed to write rewrite log {:?}: {}", self.path, e);
        }
    }
}

impl DiagnosticSink for FileSink {
    fn record(&mut self, entry: &RewriteLogEntry) {
        let mut block = format!(
            "FILE: {}:{}\n  TYPE: {}\n  ORIGINAL: {}\n",
            entry.file.display(),
            entry.line,
            entry.tag,
            entry.original
        );
        if entry.tag.is_pass_through() || entry.replacement.is_empty() {
            block.push_str("  NEW: (unchanged)\n");
        } else {
            for line in &entry.replacement {
                block.push_str(&format!("  NEW: {line}\n"));
            }
        }
        self.write_block(&block);
    }

    fn file_diff(&mut self, path: &Path, before: &str, after: &str) {
        let mut block = format!("CHANGES DETECTED in {}\nDIFF:\n", path.display());
        block.push_str(&unified_diff(path, before, after));
        if !block.ends_with('\n') {
            block.push('\n');
        }
        self.write_block(&block);
    }

    fn note(&mut self, message: &str) {
        self.write_block(&format!("{message}\n"));
    }
}

/// Collects everything in memory, used for `--json` reports and tests
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub entries: Vec<RewriteLogEntry>,
    pub diffs: Vec<(PathBuf, String)>,
    pub notes: Vec<String>,
}

impl MemorySink {
    pub fn tags(&self) -> Vec<RewriteTag> {
        self.entries.iter().map(|e| e.tag).collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, entry: &RewriteLogEntry) {
        self.entries.push(entry.clone());
    }

    fn file_diff(&mut self, path: &Path, before: &str, after: &str) {
        self.diffs
            .push((path.to_path_buf(), unified_diff(path, before, after)));
    }

    fn note(&mut self, message: &str) {
        self.notes.push(message.to_string());
    }
}

/// Unified diff of a file's content before and after rewriting
pub fn unified_diff(path: &Path, before: &str, after: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    similar::TextDiff::from_lines(before, after)
        .unified_diff()
        .header(&format!("original/{name}"), &format!("modified/{name}"))
        .to_string()
}
