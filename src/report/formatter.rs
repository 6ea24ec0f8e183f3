use std::path::Path;

use serde::Serialize;

use crate::graph::{ModuleRecord, ModuleRegistry};
use crate::report::paths::relative_path;
use crate::types::{AnalysisStats, ImportKind};

/// JSON view of one record, with every path made relative to the base.
#[derive(Serialize)]
struct RecordView<'a> {
    path: String,
    local_imports: Vec<String>,
    imported_by_local: Vec<String>,
    third_party_imports: &'a [String],
    namespaced_imports: &'a [String],
    unknown_imports: &'a [String],
    missing_imports: &'a [String],
}

impl<'a> RecordView<'a> {
    fn new(record: &'a ModuleRecord, base: &Path) -> Self {
        let rel = |p: &Path| relative_path(p, base).to_string_lossy().to_string();
        Self {
            path: rel(record.identity.as_path()),
            local_imports: record.local_imports.iter().map(|p| rel(p.as_path())).collect(),
            imported_by_local: record.imported_by_local.iter().map(|p| rel(p.as_path())).collect(),
            third_party_imports: &record.third_party_imports,
            namespaced_imports: &record.namespaced_imports,
            unknown_imports: &record.unknown_imports,
            missing_imports: &record.missing_imports,
        }
    }
}

/// Formats the registry as the plain-text report, paths relative to `base`.
pub fn format_report_as_text(registry: &ModuleRegistry, base: &Path) -> String {
    registry.render_report(base)
}

/// Formats every record, in insertion order, as pretty-printed JSON.
pub fn format_registry_as_json(registry: &ModuleRegistry, base: &Path) -> String {
    let views: Vec<RecordView<'_>> = registry
        .iter()
        .map(|record| RecordView::new(record, base))
        .collect();
    serde_json::to_string_pretty(&views).unwrap_or_default()
}

/// Formats run statistics as a short human-readable summary.
pub fn format_stats(stats: &AnalysisStats) -> String {
    let mut out = String::new();
    out.push_str("Import Summary\n");
    out.push_str(&format!("  Files:      {}\n", stats.file_count));
    out.push_str(&format!("  Modules:    {}\n", stats.module_count));
    out.push_str(&format!("  References: {}\n", stats.reference_count));
    for kind in ImportKind::ALL {
        out.push_str(&format!("    {}: {}\n", kind.as_str(), stats.of_kind(kind)));
    }
    out.push_str(&format!("  Time:       {}ms\n", stats.duration_ms));
    out
}

/// Formats run statistics as pretty-printed JSON.
pub fn format_stats_as_json(stats: &AnalysisStats) -> String {
    serde_json::to_string_pretty(stats).unwrap_or_default()
}
