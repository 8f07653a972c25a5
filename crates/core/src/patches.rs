//! Literal text fixups applied to specific vendored files after their
//! imports have been rewritten

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CodePatch {
    /// File name the patch applies to, e.g. `api_implementation.py`
    pub file_name: String,
    /// Directory name that must appear among the file's ancestors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor: Option<String>,
    pub find: String,
    pub replace: String,
}

impl CodePatch {
    pub fn matches(&self, path: &Path) -> bool {
        if path.file_name().is_none_or(|n| n != self.file_name.as_str()) {
            return false;
        }
        match &self.ancestor {
            Some(ancestor) => path
                .ancestors()
                .skip(1)
                .any(|p| p.file_name().is_some_and(|n| n == ancestor.as_str())),
            None => true,
        }
    }

    /// Patched text, or `None` when `find` does not occur
    pub fn apply(&self, text: &str) -> Option<String> {
        text.contains(&self.find)
            .then(|| text.replace(&self.find, &self.replace))
    }
}

/// Patches every vendoring run needs.
///
/// protobuf would otherwise pick its C++ backend, which clashes with the
/// copy loaded by the host application.
pub fn builtin_patches() -> Vec<CodePatch> {
    vec![CodePatch {
        file_name: "api_implementation.py".to_string(),
        ancestor: Some("protobuf".to_string()),
        find: "_implementation_type = None".to_string(),
        replace: "_implementation_type = 'python'".to_string(),
    }]
}
