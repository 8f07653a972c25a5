//! Project-provided extension points: a per-file code transform applied
//! after rewriting, and a script run after packages are installed

use crate::error::{Error, Result};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Python module, inside the scripts dir, that may define
/// `transform_code(path, code) -> str`
pub const VENDOR_HOOKS_MODULE: &str = "vendor_hooks.py";

/// Script stem, inside the scripts dir, run after installing packages
pub const VENDOR_SCRIPT_STEM: &str = "vendor";

pub trait CodeTransform: fmt::Debug {
    /// Final text for `path`, given its rewritten `code`
    fn transform(&self, path: &Path, code: &str) -> Result<String>;
}

// Loads the hooks module by path, feeds stdin through `transform_code` and
// echoes the input when the module does not define it.
const TRANSFORM_SHIM: &str = "\
import importlib.util, pathlib, sys
spec = importlib.util.spec_from_file_location('vendor_hooks', sys.argv[1])
hooks = importlib.util.module_from_spec(spec)
spec.loader.exec_module(hooks)
code = sys.stdin.read()
transform = getattr(hooks, 'transform_code', None)
sys.stdout.write(transform(pathlib.Path(sys.argv[2]), code) if transform else code)
";

/// Runs `transform_code` from a project's `vendor_hooks.py` with the
/// configured interpreter
#[derive(Debug, Clone)]
pub struct PythonHookTransform {
    pub python: String,
    pub module: PathBuf,
}

impl PythonHookTransform {
    pub fn new(python: impl Into<String>, module: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            module: module.into(),
        }
    }

    pub fn args(&self, path: &Path) -> Vec<String> {
        vec![
            "-c".to_string(),
            TRANSFORM_SHIM.to_string(),
            self.module.display().to_string(),
            path.display().to_string(),
        ]
    }
}

impl CodeTransform for PythonHookTransform {
    fn transform(&self, path: &Path, code: &str) -> Result<String> {
        debug!("Transforming {:?} with {:?}", path, self.module);
        let mut child = Command::new(&self.python)
            .args(self.args(path))
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::HookError(format!("failed to run {}: {e}", self.python)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::HookError("hook stdin unavailable".to_string()))?;
        let input = code.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(Error::HookError(format!(
                "{} failed on {}: {}",
                self.module.display(),
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        writer
            .join()
            .map_err(|_| Error::HookError("hook stdin writer panicked".to_string()))??;

        String::from_utf8(output.stdout).map_err(|e| {
            Error::HookError(format!(
                "{} returned invalid UTF-8 for {}: {e}",
                self.module.display(),
                path.display()
            ))
        })
    }
}

/// `<scripts_dir>/vendor.sh`, or `vendor.ps1` on Windows, if present
pub fn find_vendor_script(scripts_dir: &Path) -> Option<PathBuf> {
    let extension = if cfg!(windows) { "ps1" } else { "sh" };
    let script = scripts_dir.join(format!("{VENDOR_SCRIPT_STEM}.{extension}"));
    script.is_file().then_some(script)
}

pub trait ScriptRunner {
    fn run(&self, script: &Path, working_dir: &Path) -> Result<()>;
}

/// Runs `.sh` scripts with bash and `.ps1` scripts with PowerShell
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellScriptRunner;

impl ShellScriptRunner {
    pub fn command_line(script: &Path) -> Vec<String> {
        let script = script.display().to_string();
        if script.ends_with(".ps1") {
            vec![
                "powershell".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
                script,
            ]
        } else {
            vec!["bash".to_string(), script]
        }
    }
}

impl ScriptRunner for ShellScriptRunner {
    fn run(&self, script: &Path, working_dir: &Path) -> Result<()> {
        let line = Self::command_line(script);
        debug!("Running: {} in {:?}", line.join(" "), working_dir);
        let status = Command::new(&line[0])
            .args(&line[1..])
            .current_dir(working_dir)
            .status()
            .map_err(|e| Error::HookError(format!("failed to run {}: {e}", line[0])))?;

        if !status.success() {
            return Err(Error::HookError(format!(
                "{} exited with {status}",
                script.display()
            )));
        }
        Ok(())
    }
}
