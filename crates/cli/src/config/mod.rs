//! Resolving the effective settings for a command: config file, then
//! environment, then command-line flags

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use vendorize_core::{
    DiagnosticSink, FileSink, MemorySink, NoopSink, VendorConfig,
};

use crate::cli::RewriteArgs;

/// Effective settings plus the project root paths are relative to
pub struct ProjectSettings {
    pub config: VendorConfig,
    pub root: PathBuf,
}

pub fn load_settings(cwd: &Path, args: &RewriteArgs) -> Result<ProjectSettings> {
    let (mut config, root) = VendorConfig::discover(cwd).context("Failed to load config")?;
    config.apply_env_overrides();
    apply_cli_overrides(&mut config, args, cwd);
    config.validate().context("Invalid configuration")?;

    debug!("Effective config (root {:?}): {:?}", root, config);
    Ok(ProjectSettings { config, root })
}

/// Flags win over the config file and the environment. Paths given on the
/// command line are relative to `cwd`, not to the project root.
pub fn apply_cli_overrides(config: &mut VendorConfig, args: &RewriteArgs, cwd: &Path) {
    if let Some(vendor) = &args.vendor {
        config.vendor_dir = cwd.join(vendor);
    }
    if !args.consumers.is_empty() {
        config.consumer_dirs = args.consumers.iter().map(|dir| cwd.join(dir)).collect();
    }
    if let Some(suffix) = &args.rename {
        config.rename_suffix = Some(suffix.clone());
    }
    if let Some(module) = &args.vendor_module {
        config.vendor_module = Some(module.clone());
    }
    if args.log {
        config.log = true;
    }
}

/// Where rewrite decisions go for this run
pub enum Sink {
    Noop(NoopSink),
    File(FileSink),
    Memory(MemorySink),
}

impl Sink {
    pub fn open(settings: &ProjectSettings, json: bool) -> Result<Self> {
        if settings.config.log {
            let path = settings.config.log_path(&settings.root);
            let sink = FileSink::create(&path)
                .with_context(|| format!("Failed to create rewrite log {}", path.display()))?;
            return Ok(Sink::File(sink));
        }
        if json {
            return Ok(Sink::Memory(MemorySink::default()));
        }
        Ok(Sink::Noop(NoopSink))
    }

    pub fn as_dyn(&mut self) -> &mut dyn DiagnosticSink {
        match self {
            Sink::Noop(sink) => sink,
            Sink::File(sink) => sink,
            Sink::Memory(sink) => sink,
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        match self {
            Sink::File(sink) => Some(sink.path()),
            _ => None,
        }
    }

    pub fn memory(&self) -> Option<&MemorySink> {
        match self {
            Sink::Memory(sink) => Some(sink),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = VendorConfig {
            vendor_dir: PathBuf::from("lib/vendor"),
            consumer_dirs: vec![PathBuf::from("lib")],
            ..VendorConfig::default()
        };
        let args = RewriteArgs {
            consumers: vec![PathBuf::from("src")],
            rename: Some("abc".to_string()),
            log: true,
            ..RewriteArgs::default()
        };
        apply_cli_overrides(&mut config, &args, Path::new("/addon"));

        assert_eq!(config.vendor_dir, PathBuf::from("lib/vendor"));
        assert_eq!(config.consumer_dirs, vec![PathBuf::from("/addon/src")]);
        assert_eq!(config.rename_suffix.as_deref(), Some("abc"));
        assert!(config.log);
    }

    #[test]
    fn test_log_flag_does_not_disable_config_log() {
        let mut config = VendorConfig {
            log: true,
            ..VendorConfig::default()
        };
        apply_cli_overrides(&mut config, &RewriteArgs::default(), Path::new("/addon"));
        assert!(config.log);
    }

    #[test]
    fn test_flag_paths_resolve_against_cwd() {
        let mut config = VendorConfig::default();
        let args = RewriteArgs {
            vendor: Some(PathBuf::from("vendor")),
            consumers: vec![PathBuf::from("."), PathBuf::from("/elsewhere/plugin")],
            ..RewriteArgs::default()
        };
        apply_cli_overrides(&mut config, &args, Path::new("/addon/src"));

        let root = Path::new("/addon");
        assert_eq!(config.vendor_path(root), PathBuf::from("/addon/src/vendor"));
        assert_eq!(
            config.consumer_paths(root),
            vec![PathBuf::from("/addon/src/."), PathBuf::from("/elsewhere/plugin")]
        );
    }
}
