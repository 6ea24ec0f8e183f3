/// Import resolution module.
///
/// Turns raw import references into classified resolutions by searching
/// for modules the way the Python runtime does.
pub mod environment;
mod finder;
pub mod module_name;
mod resolver;

pub use finder::{ModuleFinder, PathFinder};
pub use resolver::{is_within, ImportResolver};
