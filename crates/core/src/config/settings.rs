use crate::{
    diagnostics::{DEFAULT_LOG_FILE, LOGGING_ENV_VAR},
    error::{Error, Result},
    hooks::{VENDOR_HOOKS_MODULE, find_vendor_script},
    patches::{CodePatch, builtin_patches},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in every directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["vendorize.json", ".vendorize.json"];

/// Environment variable providing the rename suffix
pub const RENAME_SUFFIX_ENV_VAR: &str = "VENDORIZE_RENAME_SUFFIX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct VendorConfig {
    /// Vendor directory, relative to the project root
    pub vendor_dir: PathBuf,
    /// Plugin source directories whose imports of vendored packages are
    /// rewritten too
    pub consumer_dirs: Vec<PathBuf>,
    /// Package name consumer code uses for the vendor directory; defaults
    /// to the directory name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_module: Option<String>,
    /// Give every vendored top-level package a `_{suffix}` name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename_suffix: Option<String>,
    pub log: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub builtin_patches: bool,
    pub patches: Vec<CodePatch>,
    pub requirements: PathBuf,
    pub python: String,
    /// Directory holding `vendor_hooks.py` and `vendor.sh` / `vendor.ps1`
    pub scripts_dir: PathBuf,
    /// Run the hooks found in `scripts_dir`
    pub hooks: bool,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            vendor_dir: PathBuf::from("src/vendor"),
            consumer_dirs: Vec::new(),
            vendor_module: None,
            rename_suffix: None,
            log: false,
            log_file: None,
            builtin_patches: true,
            patches: Vec::new(),
            requirements: PathBuf::from("requirements.txt"),
            python: "python".to_string(),
            scripts_dir: PathBuf::from("scripts"),
            hooks: true,
        }
    }
}

impl VendorConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config file above `start_path`, falling back to
    /// defaults. Returns the config and the project root it is relative to.
    pub fn discover(start_path: &Path) -> Result<(Self, PathBuf)> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                let config = Self::load_from_file(&path)?;
                let root = path.parent().unwrap_or(start_path).to_path_buf();
                Ok((config, root))
            }
            None => {
                tracing::debug!("No config file found above {:?}, using defaults", start_path);
                Ok((Self::default(), start_path.to_path_buf()))
            }
        }
    }

    /// Apply `VENDORIZE_LOGGING` and `VENDORIZE_RENAME_SUFFIX`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(LOGGING_ENV_VAR) {
            self.log = value.trim() == "1";
        }
        if let Some(value) = lookup(RENAME_SUFFIX_ENV_VAR) {
            let value = value.trim();
            if !value.is_empty() {
                self.rename_suffix = Some(value.to_string());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(module) = &self.vendor_module {
            if !is_identifier(module) {
                return Err(Error::ConfigError(format!(
                    "vendor_module `{module}` is not a valid Python identifier"
                )));
            }
        }
        for consumer in &self.consumer_dirs {
            if consumer.starts_with(&self.vendor_dir) && consumer != &self.vendor_dir {
                return Err(Error::ConfigError(format!(
                    "consumer dir {} lies inside the vendor dir {}",
                    consumer.display(),
                    self.vendor_dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn vendor_path(&self, root: &Path) -> PathBuf {
        root.join(&self.vendor_dir)
    }

    pub fn consumer_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.consumer_dirs.iter().map(|dir| root.join(dir)).collect()
    }

    pub fn requirements_path(&self, root: &Path) -> PathBuf {
        root.join(&self.requirements)
    }

    pub fn log_path(&self, root: &Path) -> PathBuf {
        root.join(
            self.log_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        )
    }

    /// `vendor_hooks.py`, when hooks are enabled and the module exists
    pub fn hooks_module(&self, root: &Path) -> Option<PathBuf> {
        let module = root.join(&self.scripts_dir).join(VENDOR_HOOKS_MODULE);
        (self.hooks && module.is_file()).then_some(module)
    }

    /// Post-install script, when hooks are enabled and one exists
    pub fn vendor_script(&self, root: &Path) -> Option<PathBuf> {
        if !self.hooks {
            return None;
        }
        find_vendor_script(&root.join(&self.scripts_dir))
    }

    /// Patches to apply, built-in ones first
    pub fn effective_patches(&self) -> Vec<CodePatch> {
        let mut patches = if self.builtin_patches {
            builtin_patches()
        } else {
            Vec::new()
        };
        patches.extend(self.patches.iter().cloned());
        patches
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: VendorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, VendorConfig::default());
        assert_eq!(config.vendor_dir, PathBuf::from("src/vendor"));
        assert!(config.builtin_patches);
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vendorize.json");
        let config = VendorConfig {
            consumer_dirs: vec![PathBuf::from("src")],
            rename_suffix: Some("1234".to_string()),
            ..VendorConfig::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(VendorConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vendorize.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            VendorConfig::load_from_file(&path),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_discover_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let nested = root.join("src/gui");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(".vendorize.json"), r#"{"vendor_dir": "lib/vendor"}"#).unwrap();

        let (config, found_root) = VendorConfig::discover(&nested).unwrap();
        assert_eq!(config.vendor_dir, PathBuf::from("lib/vendor"));
        assert_eq!(found_root, root);
        assert_eq!(config.vendor_path(&found_root), root.join("lib/vendor"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (LOGGING_ENV_VAR, "1"),
            (RENAME_SUFFIX_ENV_VAR, " my_addon "),
        ]
        .into_iter()
        .collect();
        let mut config = VendorConfig::default();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));
        assert!(config.log);
        assert_eq!(config.rename_suffix.as_deref(), Some("my_addon"));
    }

    #[test]
    fn test_validate() {
        let mut config = VendorConfig {
            vendor_module: Some("my-vendor".to_string()),
            ..VendorConfig::default()
        };
        assert!(config.validate().is_err());

        config.vendor_module = Some("_vendor".to_string());
        assert!(config.validate().is_ok());

        config.consumer_dirs = vec![PathBuf::from("src/vendor/foo")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hooks_are_found_in_scripts_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let mut config = VendorConfig::default();
        assert!(config.hooks_module(root).is_none());

        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::write(root.join("scripts/vendor_hooks.py"), "").unwrap();
        assert_eq!(
            config.hooks_module(root),
            Some(root.join("scripts/vendor_hooks.py"))
        );

        config.hooks = false;
        assert!(config.hooks_module(root).is_none());
    }

    #[test]
    fn test_effective_patches() {
        let mut config = VendorConfig::default();
        assert_eq!(config.effective_patches().len(), 1);
        config.builtin_patches = false;
        assert!(config.effective_patches().is_empty());
    }
}
