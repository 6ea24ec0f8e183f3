/// File-level dependency graph: per-file import buckets plus forward and
/// backward edges between project files.
pub mod registry;

pub use registry::{ModuleRecord, ModuleRegistry};
