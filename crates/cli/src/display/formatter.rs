use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use vendorize_core::{RewriteLogEntry, RewriteReport};

pub fn print_report(report: &RewriteReport, dry_run: bool, log_path: Option<&Path>) {
    if report.packages.is_empty() {
        println!("📦 No vendored packages found");
    } else {
        println!(
            "📦 Vendored packages ({}): {}",
            report.packages.len(),
            report.packages.join(", ")
        );
    }

    for (original, renamed) in &report.renamed {
        println!("   🔀 {} -> {}", original, renamed);
    }

    let verb = if dry_run { "would change" } else { "changed" };
    println!(
        "✅ Scanned {} files, {} {}",
        report.scanned,
        verb,
        report.changed.len()
    );
    if dry_run {
        for path in &report.changed {
            println!("   • {}", path.display());
        }
    }

    for skipped in &report.skipped {
        println!(
            "⚠️  Skipped {}: {}",
            skipped.path.display(),
            skipped.reason
        );
    }

    if let Some(path) = log_path {
        println!("📝 Rewrite log: {}", path.display());
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    dry_run: bool,
    #[serde(flatten)]
    report: &'a RewriteReport,
    entries: &'a [RewriteLogEntry],
}

pub fn print_json(report: &RewriteReport, dry_run: bool, entries: &[RewriteLogEntry]) -> Result<()> {
    let output = JsonOutput {
        dry_run,
        report,
        entries,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_packages<'a>(vendor_root: &Path, names: impl Iterator<Item = &'a str>) {
    println!("📦 Vendored packages in {}:", vendor_root.display());
    let mut count = 0;
    for name in names {
        println!("   • {}", name);
        count += 1;
    }
    if count == 0 {
        println!("   (none)");
    }
}
