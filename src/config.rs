use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::errors::{InspectError, Result};

/// Name of the configuration file stored inside the `.importgraph` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory holding importgraph metadata.
pub const IMPORTGRAPH_DIR: &str = ".importgraph";

/// Module names the CPython runtime compiles into the interpreter.
///
/// These resolve without any file or namespace location. The list is used
/// when no interpreter is configured to report its own set.
pub const DEFAULT_BUILTIN_MODULES: &[&str] = &[
    "_abc",
    "_ast",
    "_codecs",
    "_collections",
    "_functools",
    "_imp",
    "_io",
    "_locale",
    "_operator",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "_symtable",
    "_thread",
    "_tokenize",
    "_tracemalloc",
    "_typing",
    "_warnings",
    "_weakref",
    "atexit",
    "builtins",
    "errno",
    "faulthandler",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "pwd",
    "sys",
    "time",
    "xxsubtype",
];

/// Configuration for an import analysis of one project.
///
/// Controls which files are scanned and where modules are looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Root directory of the project being analyzed.
    pub root_dir: String,
    /// Glob patterns for files to include, relative to the root.
    pub include: Vec<String>,
    /// Glob patterns for files to exclude, relative to the root.
    pub exclude: Vec<String>,
    /// Maximum file size in bytes; larger files are skipped.
    pub max_file_size: u64,
    /// Extra module search locations consulted after the project root.
    /// Relative entries are taken relative to the project root.
    pub search_paths: Vec<String>,
    /// Whether entries of the `PYTHONPATH` environment variable are searched.
    pub use_pythonpath: bool,
    /// Interpreter queried for its `sys.path` and built-in module names.
    pub python: Option<String>,
    /// When no interpreter is configured, look for one in `$VIRTUAL_ENV`
    /// and then on `PATH`.
    pub discover_python: bool,
    /// Module names that exist but have no location.
    pub builtin_modules: Vec<String>,
    /// File suffixes that make a loadable module, in lookup order.
    pub loadable_suffixes: Vec<String>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            version: 1,
            root_dir: String::new(),
            include: vec!["**/*.py".to_string()],
            exclude: vec![
                ".git/**".to_string(),
                ".importgraph/**".to_string(),
                "__pycache__/**".to_string(),
                "**/__pycache__/**".to_string(),
                ".venv/**".to_string(),
                "venv/**".to_string(),
                ".tox/**".to_string(),
                "build/**".to_string(),
                "dist/**".to_string(),
            ],
            max_file_size: 1_048_576,
            search_paths: Vec::new(),
            use_pythonpath: true,
            python: None,
            discover_python: true,
            builtin_modules: DEFAULT_BUILTIN_MODULES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            loadable_suffixes: vec![
                ".so".to_string(),
                ".pyd".to_string(),
                ".py".to_string(),
                ".pyc".to_string(),
            ],
        }
    }
}

impl InspectConfig {
    /// Applies command-line overrides: an explicit interpreter replaces the
    /// configured one, extra search paths go after the configured ones.
    pub fn with_overrides(mut self, python: Option<String>, search_paths: Vec<String>) -> Self {
        if python.is_some() {
            self.python = python;
        }
        self.search_paths.extend(search_paths);
        self
    }
}

/// Returns the path to the `.importgraph` directory within the given project root.
pub fn get_importgraph_dir(project_root: &Path) -> PathBuf {
    project_root.join(IMPORTGRAPH_DIR)
}

/// Returns the path to the configuration file within the `.importgraph` directory.
pub fn get_config_path(project_root: &Path) -> PathBuf {
    get_importgraph_dir(project_root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns a default configuration
/// with `root_dir` set to the given project root.
pub fn load_config(project_root: &Path) -> Result<InspectConfig> {
    let config_path = get_config_path(project_root);

    if !config_path.exists() {
        return Ok(InspectConfig {
            root_dir: project_root.to_string_lossy().to_string(),
            ..InspectConfig::default()
        });
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| InspectError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: InspectConfig =
        serde_json::from_str(&contents).map_err(|e| InspectError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it into place.
pub fn save_config(project_root: &Path, config: &InspectConfig) -> Result<()> {
    let importgraph_dir = get_importgraph_dir(project_root);
    fs::create_dir_all(&importgraph_dir).map_err(|e| InspectError::Config {
        message: format!(
            "failed to create directory '{}': {}",
            importgraph_dir.display(),
            e
        ),
    })?;

    let config_path = get_config_path(project_root);
    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| InspectError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| InspectError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, &config_path).map_err(|e| InspectError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}

/// Determines whether a file should be scanned based on the configuration's
/// include and exclude glob patterns.
///
/// A file is included only if it matches at least one include pattern and
/// no exclude pattern. Exclude patterns take precedence.
pub fn should_include_file(file_path: &str, config: &InspectConfig) -> bool {
    let match_opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    for pattern_str in &config.exclude {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_path, match_opts) {
                return false;
            }
        }
    }

    for pattern_str in &config.include {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_path, match_opts) {
                return true;
            }
        }
    }

    false
}
