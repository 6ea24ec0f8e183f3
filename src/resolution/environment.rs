//! Python interpreter probing.
//!
//! Asks an interpreter for its module search path and the names of the
//! modules compiled into it, so lookups see the same third-party packages
//! the project would see at runtime.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::errors::{InspectError, Result};

/// Prints `sys.path` and `sys.builtin_module_names` as one JSON object.
const PROBE_SCRIPT: &str = "import json, sys; \
print(json.dumps({'path': sys.path, 'builtins': list(sys.builtin_module_names)}))";

/// Executable names tried, in order, when looking for an interpreter.
const PYTHON_NAMES: &[&str] = &["python3", "python"];

/// Directory holding a virtual environment's executables.
#[cfg(windows)]
const VENV_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const VENV_BIN_DIR: &str = "bin";

/// Module search facts reported by an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonEnvironment {
    /// Non-empty `sys.path` entries, in search order.
    pub sys_path: Vec<PathBuf>,
    /// Names that resolve without a file.
    pub builtin_modules: Vec<String>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    path: Vec<String>,
    builtins: Vec<String>,
}

/// Runs `python` and returns its search path and built-in module names.
///
/// The interpreter runs with `-E` so `PYTHONPATH` is not counted twice;
/// the finder adds it on its own when enabled. The empty entry `-c`
/// puts at the front of `sys.path` is dropped.
pub fn query_interpreter(python: &str) -> Result<PythonEnvironment> {
    let output = Command::new(python)
        .args(["-E", "-c", PROBE_SCRIPT])
        .output()
        .map_err(|e| InspectError::Config {
            message: format!("failed to run interpreter '{}': {}", python, e),
        })?;

    if !output.status.success() {
        return Err(InspectError::Config {
            message: format!(
                "interpreter '{}' exited with {}: {}",
                python,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    parse_probe_output(python, &String::from_utf8_lossy(&output.stdout))
}

/// Finds an interpreter when none is configured.
///
/// Tries `$VIRTUAL_ENV` first, then `python3`/`python` on `PATH`.
pub fn discover_interpreter() -> Option<PathBuf> {
    if let Some(venv) = std::env::var_os("VIRTUAL_ENV") {
        if let Some(found) = find_in_venv(Path::new(&venv)) {
            return Some(found);
        }
    }

    PYTHON_NAMES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Returns the first interpreter inside a virtual environment, if any.
fn find_in_venv(venv: &Path) -> Option<PathBuf> {
    PYTHON_NAMES
        .iter()
        .map(|name| venv.join(VENV_BIN_DIR).join(format!("{name}{}", std::env::consts::EXE_SUFFIX)))
        .find(|path| path.is_file())
}

fn parse_probe_output(python: &str, stdout: &str) -> Result<PythonEnvironment> {
    let probe: ProbeOutput = serde_json::from_str(stdout.trim()).map_err(|e| InspectError::Config {
        message: format!("unexpected output from interpreter '{}': {}", python, e),
    })?;

    Ok(PythonEnvironment {
        sys_path: probe
            .path
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect(),
        builtin_modules: probe.builtins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output_drops_empty_entry() {
        let stdout = r#"{"path": ["", "/usr/lib/python3.12", "/venv/site-packages"], "builtins": ["sys", "builtins"]}"#;
        let env = parse_probe_output("python3", stdout).unwrap();
        assert_eq!(
            env.sys_path,
            vec![
                PathBuf::from("/usr/lib/python3.12"),
                PathBuf::from("/venv/site-packages")
            ]
        );
        assert_eq!(env.builtin_modules, vec!["sys", "builtins"]);
    }

    #[test]
    fn test_parse_probe_output_rejects_garbage() {
        assert!(matches!(
            parse_probe_output("python3", "Traceback"),
            Err(InspectError::Config { .. })
        ));
    }

    #[test]
    fn test_find_in_venv_prefers_python3() {
        let dir = tempfile::TempDir::new().unwrap();
        let bin = dir.path().join(VENV_BIN_DIR);
        let exe = |name: &str| bin.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(exe("python"), b"").unwrap();
        assert_eq!(find_in_venv(dir.path()), Some(exe("python")));

        std::fs::write(exe("python3"), b"").unwrap();
        assert_eq!(find_in_venv(dir.path()), Some(exe("python3")));
    }

    #[test]
    fn test_find_in_empty_venv() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(find_in_venv(dir.path()), None);
    }

    #[test]
    fn test_missing_interpreter_is_config_error() {
        assert!(matches!(
            query_interpreter("/nonexistent/python-for-tests"),
            Err(InspectError::Config { .. })
        ));
    }
}
