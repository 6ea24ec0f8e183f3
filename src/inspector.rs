use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{load_config, save_config, should_include_file, InspectConfig};
use crate::errors::{InspectError, Result};
use crate::extraction::{is_source_file, PythonExtractor};
use crate::graph::ModuleRegistry;
use crate::resolution::{ImportResolver, PathFinder};
use crate::types::{AnalysisStats, Resolution};

/// Central orchestrator: enumerates a project's Python files, extracts
/// their imports, resolves each one and records the result.
pub struct ImportInspector {
    config: InspectConfig,
    project_root: PathBuf,
    resolver: ImportResolver<PathFinder>,
}

/// Result of a full analysis run.
pub struct AnalysisResult {
    /// Every file seen, as a scanned source or as an import target.
    pub registry: ModuleRegistry,
    pub stats: AnalysisStats,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl ImportInspector {
    /// Writes a default configuration for the project and opens it.
    pub fn init(project_root: &Path) -> Result<Self> {
        let config = InspectConfig {
            root_dir: project_root.to_string_lossy().to_string(),
            ..InspectConfig::default()
        };
        save_config(project_root, &config)?;
        Self::with_config(project_root, config)
    }

    /// Opens a project, using its saved configuration or the defaults.
    pub fn open(project_root: &Path) -> Result<Self> {
        let config = load_config(project_root)?;
        Self::with_config(project_root, config)
    }

    /// Opens a project with an explicit configuration.
    ///
    /// The root is canonicalized so every identity and containment test
    /// downstream works on resolved absolute paths.
    pub fn with_config(project_root: &Path, config: InspectConfig) -> Result<Self> {
        let project_root = std::fs::canonicalize(project_root).map_err(|e| InspectError::File {
            message: format!("cannot open project root: {}", e),
            path: project_root.display().to_string(),
        })?;
        if !project_root.is_dir() {
            return Err(InspectError::File {
                message: "project root is not a directory".to_string(),
                path: project_root.display().to_string(),
            });
        }

        let finder = PathFinder::from_config(&project_root, &config)?;
        Ok(Self {
            config,
            project_root,
            resolver: ImportResolver::new(finder),
        })
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

impl ImportInspector {
    /// Analyzes every source file of the project.
    ///
    /// Files are processed one at a time, in enumeration order. The first
    /// parse or lookup failure aborts the run.
    pub fn analyze(&self) -> Result<AnalysisResult> {
        let start = Instant::now();
        let files = self.scan_files()?;

        let mut registry = ModuleRegistry::new();
        let mut stats = AnalysisStats {
            file_count: files.len(),
            ..AnalysisStats::default()
        };

        for file in &files {
            self.analyze_file(file, &mut registry, &mut stats)?;
        }

        stats.module_count = registry.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            files = stats.file_count,
            references = stats.reference_count,
            missing = stats.missing,
            duration_ms = stats.duration_ms,
            "analysis complete"
        );

        Ok(AnalysisResult { registry, stats })
    }

    /// Extracts, resolves and records the imports of one file.
    ///
    /// `file` must be a canonical path inside the project root.
    pub fn analyze_file(
        &self,
        file: &Path,
        registry: &mut ModuleRegistry,
        stats: &mut AnalysisStats,
    ) -> Result<()> {
        let file_label = file.display().to_string();
        let source = std::fs::read_to_string(file).map_err(|e| InspectError::File {
            message: format!("failed to read source: {}", e),
            path: file_label.clone(),
        })?;

        let imports = PythonExtractor::extract(&file_label, &source)?;
        debug!(file = %file_label, imports = imports.len(), "extracted imports");

        registry.ensure(file);
        for import in &imports {
            let resolution = self.resolver.resolve(&self.project_root, file, &import.name)?;
            registry.record(file, &import.name, &resolution);
            stats.count(resolution.kind());
        }
        Ok(())
    }

    /// Resolves a single reference as if it were imported from `importing_file`.
    ///
    /// Relative `importing_file` paths are taken relative to the project root.
    pub fn resolve(&self, importing_file: &Path, reference: &str) -> Result<Resolution> {
        let importing_file = self.project_root.join(importing_file);
        let importing_file =
            std::fs::canonicalize(&importing_file).unwrap_or(importing_file);
        self.resolver
            .resolve(&self.project_root, &importing_file, reference)
    }

    /// Lists the project's source files: canonical absolute paths, sorted by
    /// file name within each directory, filtered by the include/exclude
    /// patterns and the size limit. Hidden directories are skipped.
    pub fn scan_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.project_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.'))
            });

        for entry in walker {
            let entry = entry.map_err(|e| InspectError::File {
                message: format!("failed to walk project: {}", e),
                path: e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| self.project_root.display().to_string()),
            })?;
            if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                continue;
            }

            let path = entry.path();
            let relative = match path.strip_prefix(&self.project_root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            if !should_include_file(&relative.to_string_lossy(), &self.config) {
                continue;
            }

            let metadata = std::fs::metadata(path)?;
            if metadata.len() > self.config.max_file_size {
                warn!(
                    file = %relative.display(),
                    size = metadata.len(),
                    "skipping file over the size limit"
                );
                continue;
            }

            files.push(std::fs::canonicalize(path)?);
        }
        Ok(files)
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl ImportInspector {
    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Returns the canonical project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns the resolver used for lookups.
    pub fn resolver(&self) -> &ImportResolver<PathFinder> {
        &self.resolver
    }
}
