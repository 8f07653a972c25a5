//! vendorize - Rewrites the imports of vendored Python packages
//!
//! This crate provides functionality to:
//! - Discover which top-level packages a vendor directory provides
//! - Rewrite absolute imports of those packages into relative ones, so the
//!   vendored tree works as a subpackage of a host plugin
//! - Optionally rename vendored packages to avoid clashes with other plugins
//! - Install requirements into the vendor directory with pip
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod hooks;
pub mod imports;
pub mod installer;
pub mod parser;
pub mod patches;
pub mod rewrite;
pub mod vendor;

// Re-export commonly used types and traits
pub use error::{Error, Result};

// Re-export main API components
pub use config::VendorConfig;
pub use diagnostics::{
    DiagnosticSink, FileSink, MemorySink, NoopSink, RewriteLogEntry, RewriteTag,
};
pub use driver::{RewriteOptions, RewriteReport, SkippedFile, VendorRewriter};
pub use hooks::{CodeTransform, PythonHookTransform, ScriptRunner, ShellScriptRunner};
pub use installer::{PackageInstaller, PipInstaller, vendor_dependencies};
pub use patches::CodePatch;
pub use rewrite::{FileRewrite, ImportRewriter, RewriteContext};
pub use vendor::{FileLocation, RenameTable, VendoredPackageSet, relative_level};
