use crate::{
    diagnostics::{RewriteLogEntry, RewriteTag},
    error::Result,
    imports::{
        ImportForm, ImportReference, ModuleTarget, SelectiveImport, find_dynamic_imports,
        find_imports,
    },
    parser::{PythonParser, TextEdit, apply_edits},
    rewrite::{AliasForRename, Relocate, TargetPlan},
    vendor::{FileLocation, RenameTable, VendoredPackageSet},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only inputs shared by every file of a run
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub packages: &'a VendoredPackageSet,
    pub rename: Option<&'a RenameTable>,
    /// Name of the vendor package as seen from consumer code
    pub vendor_module: &'a str,
}

impl<'a> RewriteContext<'a> {
    pub fn new(packages: &'a VendoredPackageSet, vendor_module: &'a str) -> Self {
        Self {
            packages,
            rename: None,
            vendor_module,
        }
    }

    pub fn with_rename(mut self, table: &'a RenameTable) -> Self {
        self.rename = Some(table);
        self
    }

    /// Original name for a possibly renamed top-level name
    pub fn canonical<'b>(&'b self, name: &'b str) -> &'b str {
        match self.rename {
            Some(table) => table.canonical(name),
            None => name,
        }
    }

    pub fn in_scope(&self, root: &str) -> bool {
        self.packages.contains(self.canonical(root))
    }
}

/// Mutations already made to the file being rewritten.
///
/// Created fresh for every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileState {
    pub sys_imported: bool,
    pub package_bound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub output: String,
    pub changed: bool,
    pub entries: Vec<RewriteLogEntry>,
}

/// Rewrites the imports of one source text at a time
pub struct ImportRewriter {
    parser: PythonParser,
}

impl ImportRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PythonParser::new()?,
        })
    }

    /// Rewrite `source`, which lives at `path`.
    ///
    /// Fails with [`Error::ParseError`](crate::Error::ParseError) when the
    /// source does not parse cleanly; nothing is rewritten in that case.
    pub fn rewrite_source(
        &mut self,
        source: &str,
        path: &Path,
        location: &FileLocation,
        context: &RewriteContext,
    ) -> Result<FileRewrite> {
        let tree = self.parser.parse_strict(source, path)?;
        let root = tree.root_node();

        let mut pass = FilePass {
            path: path.to_path_buf(),
            context,
            relocate: Relocate::new(context, location),
            alias: context.rename.map(AliasForRename::new),
            state: FileState::default(),
            edits: Vec::new(),
            entries: Vec::new(),
        };

        if !context.packages.is_empty() {
            for reference in find_imports(root, source) {
                match &reference.form {
                    ImportForm::Module(targets) => pass.module_import(&reference, targets),
                    ImportForm::Selective(import) => pass.selective_import(&reference, import)?,
                }
            }
        }

        for (line, call) in find_dynamic_imports(root, source) {
            debug!("{}:{}: dynamic import left as is: {}", path.display(), line, call);
            pass.log(line, call, Vec::new(), RewriteTag::DynamicImport);
        }

        let output = apply_edits(source, &pass.edits)?;
        Ok(FileRewrite {
            changed: output != source,
            output,
            entries: pass.entries,
        })
    }
}

struct FilePass<'a> {
    path: PathBuf,
    context: &'a RewriteContext<'a>,
    relocate: Relocate<'a>,
    alias: Option<AliasForRename<'a>>,
    state: FileState,
    edits: Vec<TextEdit>,
    entries: Vec<RewriteLogEntry>,
}

impl FilePass<'_> {
    fn module_import(&mut self, reference: &ImportReference, targets: &[ModuleTarget]) {
        let mut kept = Vec::new();
        let mut emitted = Vec::new();

        for target in targets {
            if !self.context.in_scope(target.path.root()) {
                kept.push(target.text.as_str());
                continue;
            }

            let original = format!("import {}", target.text);
            match self.relocate.module_target(target, &mut self.state) {
                TargetPlan::Preserve(tag) => {
                    kept.push(target.text.as_str());
                    self.log(reference.line, original, Vec::new(), tag);
                }
                TargetPlan::Emit {
                    mut statements,
                    tag,
                } => {
                    if let Some(policy) = &self.alias {
                        statements.iter_mut().for_each(|s| policy.apply(s));
                    }
                    let rendered: Vec<String> =
                        statements.iter().map(ToString::to_string).collect();
                    self.log(reference.line, original, rendered.clone(), tag);
                    emitted.extend(rendered);
                }
            }
        }

        if emitted.is_empty() {
            return;
        }

        let mut parts = Vec::with_capacity(emitted.len() + 1);
        if !kept.is_empty() {
            parts.push(format!("import {}", kept.join(", ")));
        }
        parts.extend(emitted);
        // Same logical line keeps indentation and one-line suites valid
        self.edits
            .push(TextEdit::replace(reference.span.clone(), parts.join("; ")));
    }

    fn selective_import(
        &mut self,
        reference: &ImportReference,
        import: &SelectiveImport,
    ) -> Result<()> {
        if import.is_relative() {
            let Some(policy) = &self.alias else {
                return Ok(());
            };
            let inserts = policy.relative_aliases(import);
            if !inserts.is_empty() {
                let rendered = render_statement(reference, &inserts)?;
                self.log(
                    reference.line,
                    reference.text.clone(),
                    vec![rendered],
                    RewriteTag::RenameAlias,
                );
                self.edits.extend(inserts);
            }
            return Ok(());
        }

        let Some(module) = &import.module else {
            return Ok(());
        };
        let Some((mut relocated, tag)) = self.relocate.selective(module) else {
            return Ok(());
        };

        if import.is_star() {
            debug!(
                "{}:{}: star import left as is: {}",
                self.path.display(),
                reference.line,
                reference.text
            );
            self.log(
                reference.line,
                reference.text.clone(),
                Vec::new(),
                RewriteTag::StarImport,
            );
            return Ok(());
        }

        if let Some(policy) = &self.alias {
            policy.apply_module(&mut relocated);
        }
        let edit = TextEdit::replace(import.module_span.clone(), relocated.to_string());
        let rendered = render_statement(reference, std::slice::from_ref(&edit))?;
        self.log(reference.line, reference.text.clone(), vec![rendered], tag);
        self.edits.push(edit);
        Ok(())
    }

    fn log(&mut self, line: usize, original: String, replacement: Vec<String>, tag: RewriteTag) {
        debug!(
            "{}:{}: {} {} -> {:?}",
            self.path.display(),
            line,
            tag,
            original,
            replacement
        );
        self.entries.push(RewriteLogEntry {
            file: self.path.clone(),
            line,
            original,
            replacement,
            tag,
        });
    }
}

/// Statement text after applying file-level `edits` that fall inside it
fn render_statement(reference: &ImportReference, edits: &[TextEdit]) -> Result<String> {
    let offset = reference.span.start;
    let local: Vec<TextEdit> = edits
        .iter()
        .map(|edit| {
            TextEdit::replace(
                edit.range.start - offset..edit.range.end - offset,
                edit.replacement.clone(),
            )
        })
        .collect();
    apply_edits(&reference.text, &local)
}
