use anyhow::{Context, Result};
use std::env;
use tracing::{debug, info};
use vendorize_core::{RewriteOptions, RewriteReport, VendorRewriter};

use crate::cli::RewriteArgs;
use crate::config::{ProjectSettings, Sink, load_settings};
use crate::display::{print_json, print_report};

pub fn rewrite_command(args: &RewriteArgs) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let settings = load_settings(&cwd, args)?;
    run_rewrite(&settings, args)?;
    Ok(())
}

/// Rewrite with resolved settings and print the outcome
pub fn run_rewrite(settings: &ProjectSettings, args: &RewriteArgs) -> Result<RewriteReport> {
    let mut sink = Sink::open(settings, args.json)?;

    let options = RewriteOptions {
        dry_run: args.dry_run,
        ..RewriteOptions::from_config(&settings.config, &settings.root)
    };
    debug!("Rewrite options: {:?}", options);
    info!("Rewriting imports in {}", options.vendor_root.display());

    let mut rewriter = VendorRewriter::new(options)?;
    let report = rewriter.run(sink.as_dyn()).with_context(|| {
        format!(
            "Failed to rewrite imports in {}",
            settings.config.vendor_path(&settings.root).display()
        )
    })?;

    print_outcome(&report, args, &sink)?;
    Ok(report)
}

pub fn print_outcome(report: &RewriteReport, args: &RewriteArgs, sink: &Sink) -> Result<()> {
    if args.json {
        let entries = sink.memory().map(|m| m.entries.as_slice()).unwrap_or(&[]);
        print_json(report, args.dry_run, entries)
    } else {
        print_report(report, args.dry_run, sink.log_path());
        Ok(())
    }
}
