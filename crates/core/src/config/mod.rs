//! Configuration management for vendorize

mod settings;

// Re-export main types
pub use settings::{CONFIG_FILE_NAMES, VendorConfig};
