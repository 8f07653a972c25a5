pub mod formatter;

pub use formatter::{print_json, print_packages, print_report};
