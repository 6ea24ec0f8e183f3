use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::InspectConfig;
use crate::errors::{InspectError, Result};
use crate::resolution::environment::{discover_interpreter, query_interpreter, PythonEnvironment};
use crate::resolution::module_name::validate_module_name;
use crate::types::{Lookup, ModuleLocation};

const INIT_STEM: &str = "__init__";

/// Suffixes whose files may carry an ABI tag between the module name and
/// the suffix (`_speedups.cpython-312-x86_64-linux-gnu.so`).
const EXTENSION_SUFFIXES: &[&str] = &[".so", ".pyd"];

/// Locates modules by absolute dotted name.
///
/// Implementations answer "where would the runtime load this from": a
/// file, a namespace package, a location-less built-in, or nowhere.
/// Returning `Lookup::NotFound` is the expected way to say a module does
/// not exist; `Err` is reserved for lookups that could not be carried out.
pub trait ModuleFinder {
    fn find(&self, name: &str) -> Result<Lookup>;
}

/// Path-based module finder mirroring the runtime's search over `sys.path`.
#[derive(Debug, Clone)]
pub struct PathFinder {
    search_paths: Vec<PathBuf>,
    builtin_modules: HashSet<String>,
    suffixes: Vec<String>,
}

impl PathFinder {
    /// Creates a finder over the given search locations, in priority order.
    pub fn new(
        search_paths: Vec<PathBuf>,
        builtin_modules: impl IntoIterator<Item = String>,
        suffixes: Vec<String>,
    ) -> Self {
        let mut seen = HashSet::new();
        let search_paths = search_paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self {
            search_paths,
            builtin_modules: builtin_modules.into_iter().collect(),
            suffixes,
        }
    }

    /// Builds the search path for a project: the project root first, then
    /// configured entries, `PYTHONPATH`, and finally whatever the interpreter
    /// reports.
    ///
    /// A configured interpreter that cannot be queried is an error. A
    /// discovered one is optional: if it is absent or fails, the run goes on
    /// without its search path.
    pub fn from_config(project_root: &Path, config: &InspectConfig) -> Result<Self> {
        let mut search_paths = vec![project_root.to_path_buf()];

        for entry in &config.search_paths {
            search_paths.push(project_root.join(entry));
        }

        if config.use_pythonpath {
            if let Some(value) = std::env::var_os("PYTHONPATH") {
                search_paths.extend(
                    std::env::split_paths(&value)
                        .filter(|p| !p.as_os_str().is_empty())
                        .map(|p| project_root.join(p)),
                );
            }
        }

        let mut builtin_modules = config.builtin_modules.clone();
        if let Some(env) = interpreter_environment(config)? {
            search_paths.extend(env.sys_path);
            builtin_modules = env.builtin_modules;
        }

        Ok(Self::new(
            search_paths,
            builtin_modules,
            config.loadable_suffixes.clone(),
        ))
    }

    /// Returns the search locations consulted for top-level names.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Looks `name` (a single segment) up in each location in turn.
    fn find_in(&self, module: &str, name: &str, locations: &[PathBuf]) -> Result<Lookup> {
        let mut portions = Vec::new();

        for location in locations {
            if !is_dir(location, module)? {
                continue;
            }

            let candidate = location.join(name);
            let candidate_is_dir = is_dir(&candidate, module)?;

            if candidate_is_dir {
                for suffix in &self.suffixes {
                    let init = candidate.join(format!("{INIT_STEM}{suffix}"));
                    if is_file(&init, module)? {
                        return Ok(Lookup::Found(ModuleLocation::File {
                            origin: init,
                            search_dir: Some(candidate),
                        }));
                    }
                }
            }

            if let Some(origin) = self.find_module_file(location, name, module)? {
                return Ok(Lookup::Found(ModuleLocation::File {
                    origin,
                    search_dir: None,
                }));
            }

            if candidate_is_dir {
                portions.push(candidate);
            }
        }

        if portions.is_empty() {
            Ok(Lookup::NotFound)
        } else {
            Ok(Lookup::Found(ModuleLocation::Namespace(portions)))
        }
    }

    /// Finds a plain module file for `name` directly inside `location`.
    ///
    /// Suffixes are tried in configured order. For an extension suffix,
    /// ABI-tagged files are tried before the untagged one.
    fn find_module_file(&self, location: &Path, name: &str, module: &str) -> Result<Option<PathBuf>> {
        let mut entries: Option<Vec<String>> = None;

        for suffix in &self.suffixes {
            if EXTENSION_SUFFIXES.contains(&suffix.as_str()) {
                if entries.is_none() {
                    entries = Some(list_file_names(location, module)?);
                }
                let prefix = format!("{name}.");
                let exact = format!("{name}{suffix}");
                let mut tagged: Vec<&String> = entries
                    .iter()
                    .flatten()
                    .filter(|f| f.starts_with(&prefix) && f.ends_with(suffix.as_str()) && **f != exact)
                    .collect();
                tagged.sort();
                for file_name in tagged {
                    let path = location.join(file_name);
                    if is_file(&path, module)? {
                        return Ok(Some(path));
                    }
                }
            }

            let path = location.join(format!("{name}{suffix}"));
            if is_file(&path, module)? {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

impl ModuleFinder for PathFinder {
    fn find(&self, name: &str) -> Result<Lookup> {
        validate_module_name(name)?;

        if self.builtin_modules.contains(name) {
            return Ok(Lookup::Found(ModuleLocation::Opaque));
        }

        match name.rsplit_once('.') {
            None => self.find_in(name, name, &self.search_paths),
            Some((parent, child)) => {
                let locations = match self.find(parent)? {
                    Lookup::Found(ModuleLocation::File {
                        search_dir: Some(dir),
                        ..
                    }) => vec![dir],
                    Lookup::Found(ModuleLocation::Namespace(portions)) => portions,
                    // A missing parent, a plain module or a built-in cannot
                    // hold submodules.
                    _ => return Ok(Lookup::NotFound),
                };
                self.find_in(name, child, &locations)
            }
        }
    }
}

/// Queries the configured interpreter, or a discovered one when allowed.
fn interpreter_environment(config: &InspectConfig) -> Result<Option<PythonEnvironment>> {
    if let Some(python) = &config.python {
        let env = query_interpreter(python)?;
        debug!(
            python = %python,
            entries = env.sys_path.len(),
            "using interpreter search path"
        );
        return Ok(Some(env));
    }

    if !config.discover_python {
        return Ok(None);
    }

    let python = match discover_interpreter() {
        Some(p) => p,
        None => {
            warn!("no Python interpreter found; stdlib and installed packages will be reported missing");
            return Ok(None);
        }
    };
    let python = python.to_string_lossy().to_string();
    match query_interpreter(&python) {
        Ok(env) => {
            debug!(
                python = %python,
                entries = env.sys_path.len(),
                "using discovered interpreter search path"
            );
            Ok(Some(env))
        }
        Err(e) => {
            warn!(python = %python, error = %e, "ignoring discovered interpreter");
            Ok(None)
        }
    }
}

/// Stats `path`, treating a missing entry as absent and any other failure
/// as fatal for the lookup of `module`.
fn probe(path: &Path, module: &str) -> Result<Option<fs::Metadata>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(lookup_io_error(path, module, e)),
    }
}

fn list_file_names(location: &Path, module: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(location).map_err(|e| lookup_io_error(location, module, e))? {
        let entry = entry.map_err(|e| lookup_io_error(location, module, e))?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

fn is_dir(path: &Path, module: &str) -> Result<bool> {
    Ok(probe(path, module)?.map(|m| m.is_dir()).unwrap_or(false))
}

fn is_file(path: &Path, module: &str) -> Result<bool> {
    Ok(probe(path, module)?.map(|m| m.is_file()).unwrap_or(false))
}

fn lookup_io_error(path: &Path, module: &str, e: io::Error) -> InspectError {
    InspectError::Lookup {
        message: format!("cannot inspect '{}': {}", path.display(), e),
        module: module.to_string(),
    }
}
