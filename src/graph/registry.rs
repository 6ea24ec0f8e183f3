use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::report::{python_list, relative_path};
use crate::types::Resolution;

/// Everything known about one file: what it imports and who imports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Canonical absolute path of the file.
    pub identity: PathBuf,
    /// Files inside the project this file imports.
    pub local_imports: Vec<PathBuf>,
    /// Files inside the project that import this file.
    pub imported_by_local: Vec<PathBuf>,
    /// References resolved to files outside the project.
    pub third_party_imports: Vec<String>,
    /// References resolved to namespace packages.
    pub namespaced_imports: Vec<String>,
    /// References that resolved to a module with no location.
    pub unknown_imports: Vec<String>,
    /// References that could not be resolved.
    pub missing_imports: Vec<String>,
}

impl ModuleRecord {
    fn new(identity: &Path) -> Self {
        Self {
            identity: identity.to_path_buf(),
            ..Self::default()
        }
    }

    /// Number of import references this file made, across all buckets.
    pub fn reference_count(&self) -> usize {
        self.local_imports.len()
            + self.third_party_imports.len()
            + self.namespaced_imports.len()
            + self.unknown_imports.len()
            + self.missing_imports.len()
    }
}

/// Insertion-ordered collection of module records keyed by file identity.
///
/// Every identity mentioned by any record has a record of its own.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<PathBuf, ModuleRecord>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record for `identity` unless one exists.
    pub fn ensure(&mut self, identity: &Path) {
        self.entry(identity);
    }

    fn entry(&mut self, identity: &Path) -> &mut ModuleRecord {
        self.modules
            .entry(identity.to_path_buf())
            .or_insert_with(|| ModuleRecord::new(identity))
    }

    /// Records that `origin` imports the in-project file `target`, adding
    /// both the forward and the backward edge.
    pub fn add_local_import(&mut self, origin: &Path, target: &Path) {
        self.ensure(origin);
        self.entry(target)
            .imported_by_local
            .push(origin.to_path_buf());
        self.entry(origin).local_imports.push(target.to_path_buf());
    }

    pub fn add_third_party_import(&mut self, origin: &Path, reference: &str) {
        self.entry(origin)
            .third_party_imports
            .push(reference.to_string());
    }

    pub fn add_namespaced_import(&mut self, origin: &Path, reference: &str) {
        self.entry(origin)
            .namespaced_imports
            .push(reference.to_string());
    }

    pub fn add_unknown_import(&mut self, origin: &Path, reference: &str) {
        self.entry(origin).unknown_imports.push(reference.to_string());
    }

    pub fn add_missing_import(&mut self, origin: &Path, reference: &str) {
        self.entry(origin).missing_imports.push(reference.to_string());
    }

    /// Files the resolution of `reference` from `origin` into its bucket.
    pub fn record(&mut self, origin: &Path, reference: &str, resolution: &Resolution) {
        match resolution {
            Resolution::Local(target) => self.add_local_import(origin, target),
            Resolution::ThirdParty(_) => self.add_third_party_import(origin, reference),
            Resolution::Namespaced => self.add_namespaced_import(origin, reference),
            Resolution::Unknown => self.add_unknown_import(origin, reference),
            Resolution::Missing => self.add_missing_import(origin, reference),
        }
    }

    pub fn get(&self, identity: &Path) -> Option<&ModuleRecord> {
        self.modules.get(identity)
    }

    pub fn contains(&self, identity: &Path) -> bool {
        self.modules.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Records in the order they were first touched.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values()
    }

    /// Total number of classified references across all records.
    pub fn total_references(&self) -> usize {
        self.modules.values().map(ModuleRecord::reference_count).sum()
    }

    /// Renders the flagged conditions of every record, one per line, with
    /// paths relative to `base`.
    ///
    /// Per record, in this order: `not imported` when nothing in the project
    /// imports it, then the unknown, missing and namespaced buckets when
    /// they are non-empty.
    pub fn render_report(&self, base: &Path) -> String {
        let mut out = String::new();
        for record in self.modules.values() {
            let path = relative_path(&record.identity, base);
            let path = path.display();

            if record.imported_by_local.is_empty() {
                out.push_str(&format!("{}: not imported\n", path));
            }
            if !record.unknown_imports.is_empty() {
                out.push_str(&format!(
                    "{}: unknown imports: {}\n",
                    path,
                    python_list(&record.unknown_imports)
                ));
            }
            if !record.missing_imports.is_empty() {
                out.push_str(&format!(
                    "{}: missing imports: {}\n",
                    path,
                    python_list(&record.missing_imports)
                ));
            }
            if !record.namespaced_imports.is_empty() {
                out.push_str(&format!(
                    "{}: namespaced imports: {}\n",
                    path,
                    python_list(&record.namespaced_imports)
                ));
            }
        }
        out
    }
}
