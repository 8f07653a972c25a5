//! vendorize - Rewrites the imports of vendored Python packages
//!
//! Thin facade over [`vendorize_core`]; the command-line tool lives in the
//! `vendorize-cli` crate.
pub use vendorize_core::*;
