//! Import statements as seen by the rewriter

pub mod dotted_path;
pub mod reference;

pub use dotted_path::DottedPath;
pub use reference::{
    ImportForm, ImportReference, ImportedName, ImportedNames, ModuleTarget, SelectiveImport,
    find_dynamic_imports, find_imports,
};
