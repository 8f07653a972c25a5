use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use vendorize_core::{PipInstaller, ShellScriptRunner, vendor_dependencies};

use crate::cli::RewriteArgs;
use crate::commands::rewrite::{print_outcome, run_rewrite};
use crate::config::{Sink, load_settings};

pub fn vendor_command(
    requirements: Option<PathBuf>,
    python: Option<String>,
    args: &RewriteArgs,
) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let mut settings = load_settings(&cwd, args)?;
    if let Some(requirements) = requirements {
        settings.config.requirements = cwd.join(requirements);
    }
    if let Some(python) = python {
        settings.config.python = python;
    }

    let vendor_root = settings.config.vendor_path(&settings.root);
    let requirements = settings.config.requirements_path(&settings.root);
    if !requirements.exists() {
        anyhow::bail!("Requirements file not found: {}", requirements.display());
    }

    let installer = PipInstaller::new(settings.config.python.clone());
    if args.dry_run {
        if !args.json {
            println!(
                "🔍 Would run: {}",
                installer.to_shell_command(&requirements, &vendor_root)
            );
        }
        if vendor_root.is_dir() {
            run_rewrite(&settings, args)?;
        }
        return Ok(());
    }

    if !args.json {
        println!(
            "🚀 Vendoring {} into {}",
            requirements.display(),
            vendor_root.display()
        );
    }
    let mut sink = Sink::open(&settings, args.json)?;
    let report = vendor_dependencies(
        &settings.config,
        &settings.root,
        &installer,
        &ShellScriptRunner,
        sink.as_dyn(),
    )
    .context("Failed to vendor requirements")?;
    print_outcome(&report, args, &sink)
}
