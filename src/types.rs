use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Classification buckets an import reference can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Local,
    ThirdParty,
    Namespaced,
    Unknown,
    Missing,
}

impl ImportKind {
    /// Every kind, in report order.
    pub const ALL: [ImportKind; 5] = [
        ImportKind::Local,
        ImportKind::ThirdParty,
        ImportKind::Namespaced,
        ImportKind::Unknown,
        ImportKind::Missing,
    ];

    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Local => "local",
            ImportKind::ThirdParty => "third_party",
            ImportKind::Namespaced => "namespaced",
            ImportKind::Unknown => "unknown",
            ImportKind::Missing => "missing",
        }
    }
}

/// Outcome of resolving one raw import reference.
///
/// Fatal lookup failures are not represented here; they travel through
/// [`crate::errors::InspectError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The module could not be found anywhere.
    Missing,
    /// The module exists but has neither a file nor a namespace location.
    Unknown,
    /// The module is a namespace package.
    Namespaced,
    /// The module is a file inside the project root (canonical path).
    Local(PathBuf),
    /// The module is a file outside the project root (canonical path).
    ThirdParty(PathBuf),
}

impl Resolution {
    /// Returns the bucket this resolution is recorded in.
    pub fn kind(&self) -> ImportKind {
        match self {
            Resolution::Missing => ImportKind::Missing,
            Resolution::Unknown => ImportKind::Unknown,
            Resolution::Namespaced => ImportKind::Namespaced,
            Resolution::Local(_) => ImportKind::Local,
            Resolution::ThirdParty(_) => ImportKind::ThirdParty,
        }
    }

    /// Returns the resolved file, if the module has one.
    pub fn origin(&self) -> Option<&PathBuf> {
        match self {
            Resolution::Local(path) | Resolution::ThirdParty(path) => Some(path),
            _ => None,
        }
    }
}

/// Where a module finder located a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleLocation {
    /// A loadable file. `search_dir` is set for regular packages and names
    /// the directory their submodules are looked up in.
    File {
        origin: PathBuf,
        search_dir: Option<PathBuf>,
    },
    /// A namespace package made of one or more directory portions.
    Namespace(Vec<PathBuf>),
    /// A module with no location at all (built-in or frozen).
    Opaque,
}

/// Result of a module finder lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ModuleLocation),
    NotFound,
}

/// An import reference as written in a source file.
///
/// `name` is the dotted module name; relative references keep their
/// leading dots (`.`, `..models`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImport {
    pub name: String,
    /// 1-based line of the import statement.
    pub line: u32,
}

impl RawImport {
    /// Returns `true` if the reference is relative to the importing package.
    pub fn is_relative(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Aggregate numbers for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Number of source files scanned.
    pub file_count: usize,
    /// Number of module records in the registry (scanned files plus targets).
    pub module_count: usize,
    /// Number of raw references extracted across all files.
    pub reference_count: usize,
    pub local: usize,
    pub third_party: usize,
    pub namespaced: usize,
    pub unknown: usize,
    pub missing: usize,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

impl AnalysisStats {
    /// Counts one classified reference.
    pub fn count(&mut self, kind: ImportKind) {
        self.reference_count += 1;
        match kind {
            ImportKind::Local => self.local += 1,
            ImportKind::ThirdParty => self.third_party += 1,
            ImportKind::Namespaced => self.namespaced += 1,
            ImportKind::Unknown => self.unknown += 1,
            ImportKind::Missing => self.missing += 1,
        }
    }

    /// Returns the count recorded for a kind.
    pub fn of_kind(&self, kind: ImportKind) -> usize {
        match kind {
            ImportKind::Local => self.local,
            ImportKind::ThirdParty => self.third_party,
            ImportKind::Namespaced => self.namespaced,
            ImportKind::Unknown => self.unknown,
            ImportKind::Missing => self.missing,
        }
    }
}
