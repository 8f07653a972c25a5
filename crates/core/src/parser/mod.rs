//! Python source parsing using tree-sitter
//!
//! The tree is only ever read. Rewrites are expressed as byte-range edits
//! against the original text, so everything outside an edited range is
//! reproduced byte-for-byte.

pub mod edits;
pub mod python_parser;
pub mod utils;

// Re-export commonly used items
pub use edits::{TextEdit, apply_edits};
pub use python_parser::PythonParser;
pub use utils::{collect_nodes, node_text, position_label};
