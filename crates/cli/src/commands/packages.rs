use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use vendorize_core::{VendorConfig, VendoredPackageSet};

use crate::display::print_packages;

pub fn packages_command(vendor: Option<PathBuf>) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let (mut config, root) = VendorConfig::discover(&cwd).context("Failed to load config")?;
    if let Some(vendor) = vendor {
        config.vendor_dir = cwd.join(vendor);
    }

    let vendor_root = config.vendor_path(&root);
    let packages = VendoredPackageSet::discover(&vendor_root)
        .with_context(|| format!("Failed to scan {}", vendor_root.display()))?;
    print_packages(&vendor_root, packages.iter());
    Ok(())
}
