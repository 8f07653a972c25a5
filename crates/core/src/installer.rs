//! Installing third-party packages into the vendor directory

use crate::{
    config::VendorConfig,
    diagnostics::DiagnosticSink,
    driver::{RewriteOptions, RewriteReport, VendorRewriter},
    error::{Error, Result},
    hooks::ScriptRunner,
};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

pub trait PackageInstaller {
    /// Install everything listed in `requirements` into `target_dir`
    fn install(&self, requirements: &Path, target_dir: &Path) -> Result<()>;
}

/// Installs with `<python> -m pip install --upgrade -r <reqs> --target <dir>`
#[derive(Debug, Clone)]
pub struct PipInstaller {
    pub python: String,
}

impl PipInstaller {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    pub fn args(&self, requirements: &Path, target_dir: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            "--upgrade".to_string(),
            "-r".to_string(),
            requirements.display().to_string(),
            "--target".to_string(),
            target_dir.display().to_string(),
        ]
    }

    pub fn to_shell_command(&self, requirements: &Path, target_dir: &Path) -> String {
        let mut parts = vec![self.python.clone()];
        parts.extend(self.args(requirements, target_dir));
        parts.join(" ")
    }
}

impl PackageInstaller for PipInstaller {
    fn install(&self, requirements: &Path, target_dir: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(requirements).map_err(|e| {
            Error::InstallerError(format!(
                "cannot read requirements {}: {e}",
                requirements.display()
            ))
        })?;
        if contents.trim().is_empty() {
            info!("{} is empty, nothing to install", requirements.display());
            return Ok(());
        }

        debug!("Running: {}", self.to_shell_command(requirements, target_dir));
        let status = Command::new(&self.python)
            .args(self.args(requirements, target_dir))
            .status()
            .map_err(|e| Error::InstallerError(format!("failed to run {}: {e}", self.python)))?;

        if !status.success() {
            return Err(Error::InstallerError(format!(
                "pip exited with {status} while installing {}",
                requirements.display()
            )));
        }
        Ok(())
    }
}

/// Empty the vendor directory, creating it if needed
pub fn prepare_vendor_dir(vendor_root: &Path) -> Result<()> {
    if vendor_root.exists() {
        debug!("Clearing {:?}", vendor_root);
        std::fs::remove_dir_all(vendor_root)?;
    }
    std::fs::create_dir_all(vendor_root)?;
    Ok(())
}

/// Drop the console scripts pip installs next to the packages
pub fn remove_bin_dir(vendor_root: &Path) -> Result<bool> {
    let bin = vendor_root.join("bin");
    if bin.is_dir() {
        std::fs::remove_dir_all(&bin)?;
        return Ok(true);
    }
    Ok(false)
}

/// Full vendoring run: clear, install, clean up, rewrite imports, then run
/// the project's `vendor.sh` / `vendor.ps1` from the project root
pub fn vendor_dependencies(
    config: &VendorConfig,
    root: &Path,
    installer: &dyn PackageInstaller,
    scripts: &dyn ScriptRunner,
    sink: &mut dyn DiagnosticSink,
) -> Result<RewriteReport> {
    let vendor_root = config.vendor_path(root);
    let requirements = config.requirements_path(root);

    prepare_vendor_dir(&vendor_root)?;
    info!(
        "Installing {} into {}",
        requirements.display(),
        vendor_root.display()
    );
    installer.install(&requirements, &vendor_root)?;
    if remove_bin_dir(&vendor_root)? {
        debug!("Removed installed bin directory");
    }

    let mut rewriter = VendorRewriter::new(RewriteOptions::from_config(config, root))?;
    let report = rewriter.run(sink)?;

    if let Some(script) = config.vendor_script(root) {
        info!("Running {}", script.display());
        scripts.run(&script, root)?;
        sink.note(&format!("RAN {}", script.display()));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopSink;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Drops a canned package tree into the target instead of running pip
    struct FakeInstaller {
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl PackageInstaller for FakeInstaller {
        fn install(&self, requirements: &Path, target_dir: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((requirements.to_path_buf(), target_dir.to_path_buf()));
            fs::create_dir_all(target_dir.join("foo")).unwrap();
            fs::write(target_dir.join("foo/__init__.py"), "from foo.bar import x\n").unwrap();
            fs::write(target_dir.join("foo/bar.py"), "x = 1\n").unwrap();
            fs::create_dir_all(target_dir.join("bin")).unwrap();
            fs::write(target_dir.join("bin/foo-cli"), "#!/bin/sh\n").unwrap();
            Ok(())
        }
    }

    /// Records scripts instead of running them
    #[derive(Default)]
    struct RecordingRunner {
        runs: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl ScriptRunner for RecordingRunner {
        fn run(&self, script: &Path, working_dir: &Path) -> Result<()> {
            self.runs
                .borrow_mut()
                .push((script.to_path_buf(), working_dir.to_path_buf()));
            Ok(())
        }
    }

    fn installer() -> FakeInstaller {
        FakeInstaller {
            calls: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_pip_args() {
        let pip = PipInstaller::new("python3");
        assert_eq!(
            pip.to_shell_command(Path::new("requirements.txt"), Path::new("src/vendor")),
            "python3 -m pip install --upgrade -r requirements.txt --target src/vendor"
        );
    }

    #[test]
    fn test_empty_requirements_skip_pip() {
        let temp_dir = TempDir::new().unwrap();
        let reqs = temp_dir.path().join("requirements.txt");
        fs::write(&reqs, "\n  \n").unwrap();
        let pip = PipInstaller::new("definitely-not-a-python-binary");
        assert!(pip.install(&reqs, temp_dir.path()).is_ok());
    }

    #[test]
    fn test_missing_requirements_is_installer_error() {
        let temp_dir = TempDir::new().unwrap();
        let pip = PipInstaller::new("python");
        assert!(matches!(
            pip.install(&temp_dir.path().join("missing.txt"), temp_dir.path()),
            Err(Error::InstallerError(_))
        ));
    }

    #[test]
    fn test_vendor_dependencies_pipeline() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let config = VendorConfig::default();
        let vendor = config.vendor_path(root);
        fs::create_dir_all(vendor.join("stale")).unwrap();

        let installer = installer();
        let scripts = RecordingRunner::default();
        let report =
            vendor_dependencies(&config, root, &installer, &scripts, &mut NoopSink).unwrap();

        assert_eq!(installer.calls.borrow().len(), 1);
        assert!(scripts.runs.borrow().is_empty());
        assert!(!vendor.join("stale").exists());
        assert!(!vendor.join("bin").exists());
        assert_eq!(report.packages, vec!["foo"]);
        assert_eq!(
            fs::read_to_string(vendor.join("foo/__init__.py")).unwrap(),
            "from .bar import x\n"
        );
    }

    #[test]
    fn test_vendor_script_runs_after_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let script_name = if cfg!(windows) { "vendor.ps1" } else { "vendor.sh" };
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::write(root.join("scripts").join(script_name), "npm install\n").unwrap();

        let mut config = VendorConfig::default();
        let scripts = RecordingRunner::default();
        vendor_dependencies(&config, root, &installer(), &scripts, &mut NoopSink).unwrap();
        assert_eq!(
            *scripts.runs.borrow(),
            vec![(root.join("scripts").join(script_name), root.to_path_buf())]
        );

        config.hooks = false;
        let scripts = RecordingRunner::default();
        vendor_dependencies(&config, root, &installer(), &scripts, &mut NoopSink).unwrap();
        assert!(scripts.runs.borrow().is_empty());
    }
}
