use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{InspectError, Result};
use crate::resolution::finder::{ModuleFinder, PathFinder};
use crate::resolution::module_name::{package_of, resolve_relative_name};
use crate::types::{Lookup, ModuleLocation, Resolution};

/// Classifies raw import references by looking them up through a
/// [`ModuleFinder`].
///
/// Resolution is stateless: the same inputs over an unchanged filesystem
/// always give the same answer.
pub struct ImportResolver<F: ModuleFinder = PathFinder> {
    finder: F,
}

impl<F: ModuleFinder> ImportResolver<F> {
    /// Creates a resolver over the given lookup strategy.
    pub fn new(finder: F) -> Self {
        Self { finder }
    }

    /// Returns the underlying finder.
    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// Resolves `raw_reference`, imported from `importing_file`, against the
    /// project rooted at `project_root`.
    ///
    /// Outcomes, in the order they are decided:
    /// 1. **Missing** -- the finder reports the module does not exist.
    /// 2. **Unknown** -- the module exists but has no location.
    /// 3. **Namespaced** -- the module is a namespace package.
    /// 4. **Local / ThirdParty** -- the module is a file, local when its
    ///    canonical path lies inside the canonical project root.
    ///
    /// Relative references are anchored on the package of `importing_file`.
    /// Every failure other than "not found" is returned as an error.
    pub fn resolve(
        &self,
        project_root: &Path,
        importing_file: &Path,
        raw_reference: &str,
    ) -> Result<Resolution> {
        let name = if raw_reference.starts_with('.') {
            let package = package_of(importing_file, project_root).unwrap_or_default();
            resolve_relative_name(raw_reference, &package)?
        } else {
            raw_reference.to_string()
        };

        let resolution = match self.finder.find(&name)? {
            Lookup::NotFound => Resolution::Missing,
            Lookup::Found(ModuleLocation::Opaque) => Resolution::Unknown,
            Lookup::Found(ModuleLocation::Namespace(_)) => Resolution::Namespaced,
            Lookup::Found(ModuleLocation::File { origin, .. }) => {
                let origin = canonical(&origin, &name)?;
                let root = canonical(project_root, &name)?;
                if is_within(&origin, &root) {
                    Resolution::Local(origin)
                } else {
                    Resolution::ThirdParty(origin)
                }
            }
        };

        debug!(
            reference = raw_reference,
            module = %name,
            outcome = resolution.kind().as_str(),
            "resolved import"
        );
        Ok(resolution)
    }
}

/// Returns `true` if `path` is `root` or lies beneath it.
///
/// Both paths must already be canonical. The test is component-wise, so
/// `/p/proj2/x.py` is not inside `/p/proj`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

fn canonical(path: &Path, module: &str) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| InspectError::Lookup {
        message: format!("cannot canonicalize '{}': {}", path.display(), e),
        module: module.to_string(),
    })
}
