use std::path::Path;

use crate::errors::{InspectError, Result};

const INIT_STEM: &str = "__init__";

/// Converts a file path to the dotted module name the runtime would give it
/// when `root` is on the search path.
///
/// `pkg/sub/mod.py` becomes `pkg.sub.mod` and `pkg/__init__.py` becomes
/// `pkg`. Returns `None` for paths outside `root` or for `root/__init__.py`.
pub fn module_name_for(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    let last = parts.pop()?;
    let stem = match last.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => last,
    };
    if stem != INIT_STEM {
        parts.push(stem);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Returns the package relative references in `path` are anchored on.
///
/// For a package's `__init__.py` that is the package itself, for any other
/// module its parent package. Top-level modules yield an empty string.
pub fn package_of(path: &Path, root: &Path) -> Option<String> {
    let is_init = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.split('.').next() == Some(INIT_STEM))
        .unwrap_or(false);

    if is_init {
        return Some(module_name_for(path, root).unwrap_or_default());
    }

    let name = module_name_for(path, root)?;
    Some(match name.rsplit_once('.') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    })
}

/// Turns a relative reference such as `..models` into an absolute module
/// name, given the package of the importing file.
///
/// One leading dot means the package itself, each extra dot climbs one
/// level. Climbing past the top-level package, or a relative reference
/// from a file with no package, is a lookup failure.
pub fn resolve_relative_name(reference: &str, package: &str) -> Result<String> {
    let remainder = reference.trim_start_matches('.');
    let level = reference.len() - remainder.len();
    if level == 0 {
        return Ok(reference.to_string());
    }

    if package.is_empty() {
        return Err(InspectError::Lookup {
            message: "relative import with no known parent package".to_string(),
            module: reference.to_string(),
        });
    }

    let bits: Vec<&str> = package.rsplitn(level, '.').collect();
    if bits.len() < level {
        return Err(InspectError::Lookup {
            message: "attempted relative import beyond top-level package".to_string(),
            module: reference.to_string(),
        });
    }
    let base = bits[bits.len() - 1];

    if remainder.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}.{remainder}"))
    }
}

/// Checks that `name` is an absolute dotted module name made of identifiers.
pub fn validate_module_name(name: &str) -> Result<()> {
    let malformed = |why: &str| InspectError::Lookup {
        message: format!("malformed module name: {why}"),
        module: name.to_string(),
    };

    if name.is_empty() {
        return Err(malformed("empty name"));
    }
    for part in name.split('.') {
        let mut chars = part.chars();
        match chars.next() {
            None => return Err(malformed("empty segment")),
            Some(c) if !(c == '_' || c.is_alphabetic()) => {
                return Err(malformed("segment does not start with a letter or '_'"))
            }
            _ => {}
        }
        if !chars.all(|c| c == '_' || c.is_alphanumeric()) {
            return Err(malformed("segment is not an identifier"));
        }
    }
    Ok(())
}
