//! Import rewriting for relocated packages
//!
//! [`Relocate`] classifies each import against the file's location and
//! produces new statements in terms of original package names.
//! [`AliasForRename`] then maps top-level names through a [`RenameTable`]
//! and aliases them back to the names the code expects. [`ImportRewriter`]
//! runs both over a parsed file and turns the result into text edits.
//!
//! [`RenameTable`]: crate::vendor::RenameTable

pub mod alias;
pub mod emit;
pub mod engine;
pub mod relocate;

pub use alias::AliasForRename;
pub use emit::{Emitted, EmittedName, RelativeModule, Segment};
pub use engine::{FileRewrite, FileState, ImportRewriter, RewriteContext};
pub use relocate::{Relocate, TargetPlan};
