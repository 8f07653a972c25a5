use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{init_command, packages_command, rewrite_command, vendor_command};

#[derive(Parser, Debug)]
#[command(name = "vendorize")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    \
    RUST_LOG=debug              Enable debug logging\n    \
    VENDORIZE_LOGGING=1         Write the rewrite log (import_rewrites.log)\n    \
    VENDORIZE_RENAME_SUFFIX=S   Rename vendored packages to <name>_S")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that rewrites imports
#[derive(Args, Debug, Clone, Default)]
pub struct RewriteArgs {
    /// Vendor directory (default from config, else src/vendor)
    #[arg(long)]
    pub vendor: Option<PathBuf>,

    /// Plugin source directory whose imports are rewritten too (repeatable)
    #[arg(long = "consumer")]
    pub consumers: Vec<PathBuf>,

    /// Rename vendored packages to `<name>_<SUFFIX>`
    #[arg(long, value_name = "SUFFIX")]
    pub rename: Option<String>,

    /// Package name consumer code uses for the vendor directory
    #[arg(long, value_name = "NAME")]
    pub vendor_module: Option<String>,

    /// Write every rewrite decision and a diff per file to the rewrite log
    #[arg(short, long)]
    pub log: bool,

    /// Show what would change without touching any file
    #[arg(short, long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite imports in an existing vendor directory
    #[command(visible_alias = "r")]
    Rewrite(RewriteArgs),
    /// Install requirements into the vendor directory, then rewrite imports
    Vendor {
        /// Requirements file passed to pip
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// Python interpreter used to run pip
        #[arg(long)]
        python: Option<String>,

        #[command(flatten)]
        rewrite: RewriteArgs,
    },
    /// List the top-level names the vendor directory provides
    Packages {
        /// Vendor directory (default from config, else src/vendor)
        #[arg(long)]
        vendor: Option<PathBuf>,
    },
    /// Create a vendorize.json with default settings
    Init {
        /// Specify the current working directory
        #[arg(short, long)]
        cwd: Option<String>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Rewrite(args) => rewrite_command(&args),
            Commands::Vendor {
                requirements,
                python,
                rewrite,
            } => vendor_command(requirements, python, &rewrite),
            Commands::Packages { vendor } => packages_command(vendor),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rewrite_flags() {
        let cli = Cli::try_parse_from([
            "vendorize",
            "rewrite",
            "--vendor",
            "lib/vendor",
            "--consumer",
            "src",
            "--consumer",
            "tools",
            "--rename",
            "1234",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Rewrite(args) = cli.command else {
            panic!("expected rewrite");
        };
        assert_eq!(args.vendor, Some(PathBuf::from("lib/vendor")));
        assert_eq!(args.consumers.len(), 2);
        assert_eq!(args.rename.as_deref(), Some("1234"));
        assert!(args.dry_run);
        assert!(!args.json);
    }

    #[test]
    fn test_vendor_flattens_rewrite_args() {
        let cli = Cli::try_parse_from([
            "vendorize",
            "vendor",
            "--python",
            "python3.11",
            "--log",
        ])
        .unwrap();

        let Commands::Vendor {
            python, rewrite, ..
        } = cli.command
        else {
            panic!("expected vendor");
        };
        assert_eq!(python.as_deref(), Some("python3.11"));
        assert!(rewrite.log);
    }
}
