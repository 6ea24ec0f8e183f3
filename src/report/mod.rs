/// Renders analysis results as text or JSON.
pub mod formatter;

/// Path and list rendering shared by the report formats.
pub mod paths;

pub use formatter::{
    format_registry_as_json, format_report_as_text, format_stats, format_stats_as_json,
};
pub use paths::{python_list, relative_path};
