//! Batch rewriting of a vendor directory and its consumers

use crate::{
    config::VendorConfig,
    diagnostics::{DiagnosticSink, RewriteLogEntry, RewriteTag},
    error::{Error, Result},
    hooks::{CodeTransform, PythonHookTransform},
    patches::CodePatch,
    rewrite::{ImportRewriter, RewriteContext},
    vendor::{FileLocation, RenameTable, VendoredPackageSet},
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    pub vendor_root: PathBuf,
    pub consumer_roots: Vec<PathBuf>,
    pub vendor_module: Option<String>,
    pub rename_suffix: Option<String>,
    pub patches: Vec<CodePatch>,
    /// Applied to every file after the patches
    pub transform: Option<Arc<dyn CodeTransform>>,
    /// Compute everything but leave the filesystem untouched
    pub dry_run: bool,
}

impl RewriteOptions {
    pub fn new(vendor_root: impl Into<PathBuf>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &VendorConfig, root: &Path) -> Self {
        Self {
            vendor_root: config.vendor_path(root),
            consumer_roots: config.consumer_paths(root),
            vendor_module: config.vendor_module.clone(),
            rename_suffix: config.rename_suffix.clone(),
            patches: config.effective_patches(),
            transform: config.hooks_module(root).map(|module| {
                Arc::new(PythonHookTransform::new(config.python.clone(), module))
                    as Arc<dyn CodeTransform>
            }),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub packages: Vec<String>,
    /// `(original, renamed)` for every top-level name when renaming
    pub renamed: Vec<(String, String)>,
    pub scanned: usize,
    pub changed: BTreeSet<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// Rewrites every Python file of a vendor directory, plus consumer code.
///
/// Runs in two phases: the package set and rename table are computed (and
/// the rename applied on disk) before the first file is touched; after
/// that they are read-only and each file is rewritten independently.
pub struct VendorRewriter {
    options: RewriteOptions,
    rewriter: ImportRewriter,
}

impl VendorRewriter {
    pub fn new(options: RewriteOptions) -> Result<Self> {
        Ok(Self {
            options,
            rewriter: ImportRewriter::new()?,
        })
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    pub fn run(&mut self, sink: &mut dyn DiagnosticSink) -> Result<RewriteReport> {
        let vendor_root = self
            .options
            .vendor_root
            .canonicalize()
            .map_err(|_| Error::VendorRootMissing(self.options.vendor_root.clone()))?;
        let consumer_roots = self.resolve_consumer_roots(&vendor_root)?;

        let discovered = VendoredPackageSet::discover(&vendor_root)?;
        let table = match &self.options.rename_suffix {
            Some(suffix) => Some(RenameTable::new(&discovered, suffix)?),
            None => None,
        };
        let packages = match &table {
            Some(table) => table.originals(),
            None => discovered,
        };
        info!(
            "Found vendored packages: {}",
            packages.iter().collect::<Vec<_>>().join(", ")
        );

        if let Some(table) = &table {
            info!("Renaming vendored packages with suffix `{}`", table.suffix());
            if self.options.dry_run {
                debug!("Dry run: not renaming vendored packages on disk");
            } else {
                for (from, to) in table.apply_on_disk(&vendor_root)? {
                    sink.note(&format!("RENAMED {} -> {}", from.display(), to.display()));
                }
            }
        }

        let vendor_module = match &self.options.vendor_module {
            Some(module) => module.clone(),
            None => vendor_root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("vendor")
                .to_string(),
        };
        let mut context = RewriteContext::new(&packages, &vendor_module);
        if let Some(table) = &table {
            context = context.with_rename(table);
        }

        let files = collect_files(&vendor_root, &consumer_roots)?;
        info!("Rewriting imports in {} Python files...", files.len());

        let mut report = RewriteReport {
            packages: packages.iter().map(str::to_string).collect(),
            renamed: table
                .iter()
                .flat_map(|t| t.pairs())
                .map(|(o, r)| (o.to_string(), r.to_string()))
                .collect(),
            scanned: files.len(),
            ..RewriteReport::default()
        };

        for file in files {
            let location = FileLocation::resolve(&file, &vendor_root);
            match self.rewrite_one(&file, &location, &context, sink) {
                Ok(true) => {
                    report.changed.insert(file);
                }
                Ok(false) => {}
                Err(Error::ParseError { path, reason }) => {
                    skip(&mut report, sink, path, reason);
                }
                Err(Error::HookError(reason)) => {
                    skip(&mut report, sink, file, reason);
                }
                Err(e) => return Err(e),
            }
        }

        sink.note(&format!(
            "IMPORT REWRITING COMPLETED: {} files processed, {} changed",
            report.scanned,
            report.changed.len()
        ));
        Ok(report)
    }

    fn rewrite_one(
        &mut self,
        file: &Path,
        location: &FileLocation,
        context: &RewriteContext,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<bool> {
        let source = String::from_utf8(std::fs::read(file)?).map_err(|e| Error::ParseError {
            path: file.to_path_buf(),
            reason: format!("not valid UTF-8: {}", e.utf8_error()),
        })?;
        debug!("Processing {:?} at {:?}", file, location);

        let rewrite = self
            .rewriter
            .rewrite_source(&source, file, location, context)?;
        for entry in &rewrite.entries {
            sink.record(entry);
        }

        let mut output = rewrite.output;
        for patch in self.options.patches.iter().filter(|p| p.matches(file)) {
            if let Some(patched) = patch.apply(&output) {
                sink.record(&RewriteLogEntry {
                    file: file.to_path_buf(),
                    line: 0,
                    original: patch.find.clone(),
                    replacement: vec![patch.replace.clone()],
                    tag: RewriteTag::Patch,
                });
                output = patched;
            }
        }

        if let Some(transform) = &self.options.transform {
            let transformed = transform.transform(file, &output)?;
            if transformed != output {
                sink.record(&RewriteLogEntry {
                    file: file.to_path_buf(),
                    line: 0,
                    original: "transform_code(path, code)".to_string(),
                    replacement: vec!["text changed by vendor hook".to_string()],
                    tag: RewriteTag::HookTransform,
                });
                output = transformed;
            }
        }

        if output == source {
            return Ok(false);
        }

        sink.file_diff(file, &source, &output);
        if !self.options.dry_run {
            std::fs::write(file, &output)?;
        }
        Ok(true)
    }

    /// Canonical consumer roots. Each must lie below the directory holding
    /// the vendor dir, otherwise no relative import reaches the vendor
    /// package.
    fn resolve_consumer_roots(&self, vendor_root: &Path) -> Result<Vec<PathBuf>> {
        let anchor = vendor_root.parent().unwrap_or(vendor_root);
        self.options
            .consumer_roots
            .iter()
            .map(|consumer| {
                let resolved = consumer.canonicalize().map_err(|e| {
                    Error::ConfigError(format!("consumer dir {}: {e}", consumer.display()))
                })?;
                if !resolved.starts_with(anchor) {
                    return Err(Error::ConfigError(format!(
                        "consumer dir {} is outside {}, which holds the vendor dir",
                        consumer.display(),
                        anchor.display()
                    )));
                }
                Ok(resolved)
            })
            .collect()
    }
}

fn skip(report: &mut RewriteReport, sink: &mut dyn DiagnosticSink, path: PathBuf, reason: String) {
    warn!("Could not rewrite imports in {}: {}", path.display(), reason);
    sink.note(&format!("ERROR processing {}: {}", path.display(), reason));
    report.skipped.push(SkippedFile { path, reason });
}

/// Every `.py` file under the vendor root and the consumer roots, each once,
/// in a stable order
fn collect_files(vendor_root: &Path, consumer_roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    collect_python_files(vendor_root, &mut files)?;

    for consumer in consumer_roots {
        let mut found = BTreeSet::new();
        collect_python_files(consumer, &mut found)?;
        files.extend(found.into_iter().filter(|f| !f.starts_with(vendor_root)));
    }

    Ok(files.into_iter().collect())
}

fn collect_python_files(root: &Path, files: &mut BTreeSet<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "py")
        {
            files.insert(entry.into_path());
        }
    }
    Ok(())
}
