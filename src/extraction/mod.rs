/// Tree-sitter based import extraction.
///
/// Turns Python source text into the ordered list of raw module references
/// made by its import statements.
mod python_extractor;

pub use python_extractor::PythonExtractor;

/// File extension of the sources this module understands (without leading dot).
pub const SOURCE_EXTENSION: &str = "py";

/// Returns `true` if the path names a Python source file.
pub fn is_source_file(path: &std::path::Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}
