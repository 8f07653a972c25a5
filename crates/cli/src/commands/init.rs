use anyhow::{Context, Result};
use std::{env, path::PathBuf};
use tracing::info;
use vendorize_core::VendorConfig;
use vendorize_core::config::CONFIG_FILE_NAMES;

pub fn init_command(cwd: Option<&str>, force: bool) -> Result<()> {
    // Determine the project root
    let project_root = if let Some(cwd) = cwd {
        PathBuf::from(cwd)
    } else {
        env::current_dir().context("Failed to get current directory")?
    };

    let project_root = project_root
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    println!("🚀 Initializing vendorize in: {}", project_root.display());

    let mut config = VendorConfig::default();
    // Plugin code usually sits right above its vendor directory
    if let Some(parent) = config.vendor_dir.parent() {
        if project_root.join(parent).is_dir() {
            info!("Using {} as consumer dir", parent.display());
            config.consumer_dirs.push(parent.to_path_buf());
        }
    }

    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Next steps:");
    println!("   List your dependencies in {}", config.requirements.display());
    println!("   Run `vendorize vendor` to install them into {}", config.vendor_dir.display());

    Ok(())
}
