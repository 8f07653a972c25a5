use crate::imports::DottedPath;
use crate::parser::{collect_nodes, node_text};
use std::ops::Range;
use tree_sitter::Node;

/// One import statement occurrence in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    /// Byte span of the whole statement
    pub span: Range<usize>,
    pub text: String,
    pub line: usize,
    pub form: ImportForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportForm {
    /// `import a.b as c, d`
    Module(Vec<ModuleTarget>),
    /// `from [dots]module import names`
    Selective(SelectiveImport),
}

/// One comma-separated target of a whole-module import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTarget {
    pub path: DottedPath,
    pub alias: Option<String>,
    /// Original text of the target, alias included
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectiveImport {
    /// Existing number of leading dots, 0 for absolute imports
    pub level: usize,
    pub module: Option<DottedPath>,
    /// Span of the module part including any leading dots
    pub module_span: Range<usize>,
    pub names: ImportedNames,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedNames {
    Star,
    Names(Vec<ImportedName>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
    /// Byte offset right after the imported name, where an alias goes
    pub name_end: usize,
}

impl ImportReference {
    /// Build a reference from an `import_statement` or
    /// `import_from_statement` node. Anything else yields `None`.
    pub fn from_node(node: Node, source: &str) -> Option<Self> {
        let form = match node.kind() {
            "import_statement" => ImportForm::Module(module_targets(node, source)?),
            "import_from_statement" => ImportForm::Selective(selective_import(node, source)?),
            _ => return None,
        };
        Some(Self {
            span: node.byte_range(),
            text: node_text(&node, source).to_string(),
            line: node.start_position().row + 1,
            form,
        })
    }

}

impl SelectiveImport {
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    pub fn is_star(&self) -> bool {
        matches!(self.names, ImportedNames::Star)
    }
}

/// Every import statement of a parsed file, in source order.
///
/// `from __future__ import ...` parses to its own node kind and is never
/// returned.
pub fn find_imports(root: Node, source: &str) -> Vec<ImportReference> {
    collect_nodes(root, &["import_statement", "import_from_statement"])
        .into_iter()
        .filter_map(|node| {
            let reference = ImportReference::from_node(node, source);
            if reference.is_none() {
                tracing::debug!(
                    "Unrecognized import shape at line {}: {}",
                    node.start_position().row + 1,
                    node_text(&node, source)
                );
            }
            reference
        })
        .collect()
}

/// Calls whose import target is computed at runtime, as `(line, text)`
pub fn find_dynamic_imports(root: Node, source: &str) -> Vec<(usize, String)> {
    const DYNAMIC_IMPORTERS: [&str; 3] = ["__import__", "importlib.import_module", "import_module"];

    let mut found = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "call" {
            if let Some(function) = node.child_by_field_name("function") {
                if DYNAMIC_IMPORTERS.contains(&node_text(&function, source)) {
                    found.push((
                        node.start_position().row + 1,
                        node_text(&node, source).to_string(),
                    ));
                }
            }
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    found
}

fn module_targets(node: Node, source: &str) -> Option<Vec<ModuleTarget>> {
    let mut cursor = node.walk();
    let targets: Option<Vec<_>> = node
        .children_by_field_name("name", &mut cursor)
        .map(|child| {
            let (path, alias) = match child.kind() {
                "dotted_name" => (dotted_path(child, source)?, None),
                "aliased_import" => {
                    let name = child.child_by_field_name("name")?;
                    let alias = child.child_by_field_name("alias")?;
                    (
                        dotted_path(name, source)?,
                        Some(node_text(&alias, source).to_string()),
                    )
                }
                _ => return None,
            };
            Some(ModuleTarget {
                path,
                alias,
                text: node_text(&child, source).to_string(),
            })
        })
        .collect();
    targets.filter(|t| !t.is_empty())
}

fn selective_import(node: Node, source: &str) -> Option<SelectiveImport> {
    let module_node = node.child_by_field_name("module_name")?;
    let (level, module) = match module_node.kind() {
        "dotted_name" => (0, Some(dotted_path(module_node, source)?)),
        "relative_import" => {
            let mut level = 0;
            let mut module = None;
            let mut cursor = module_node.walk();
            for child in module_node.children(&mut cursor) {
                match child.kind() {
                    "import_prefix" => {
                        level = node_text(&child, source).matches('.').count();
                    }
                    "dotted_name" => module = Some(dotted_path(child, source)?),
                    _ => {}
                }
            }
            (level, module)
        }
        _ => return None,
    };

    let mut cursor = node.walk();
    let has_star = node
        .children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import");
    let names = if has_star {
        ImportedNames::Star
    } else {
        let mut cursor = node.walk();
        let names: Option<Vec<_>> = node
            .children_by_field_name("name", &mut cursor)
            .map(|child| imported_name(child, source))
            .collect();
        ImportedNames::Names(names?)
    };

    Some(SelectiveImport {
        level,
        module,
        module_span: module_node.byte_range(),
        names,
    })
}

fn imported_name(node: Node, source: &str) -> Option<ImportedName> {
    match node.kind() {
        "dotted_name" => Some(ImportedName {
            name: dotted_path(node, source)?.to_string(),
            alias: None,
            name_end: node.end_byte(),
        }),
        "aliased_import" => {
            let name = node.child_by_field_name("name")?;
            let alias = node.child_by_field_name("alias")?;
            Some(ImportedName {
                name: dotted_path(name, source)?.to_string(),
                alias: Some(node_text(&alias, source).to_string()),
                name_end: name.end_byte(),
            })
        }
        _ => None,
    }
}

/// Join the identifiers of a `dotted_name`, dropping any whitespace or
/// line continuations between them.
fn dotted_path(node: Node, source: &str) -> Option<DottedPath> {
    let mut cursor = node.walk();
    let segments: Vec<String> = node
        .children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .map(|child| node_text(&child, source).to_string())
        .collect();
    DottedPath::new(segments)
}
