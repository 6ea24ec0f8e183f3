use thiserror::Error;

/// Errors that abort an import analysis run.
///
/// A module that cannot be found is not an error: the resolver reports it
/// as [`crate::types::Resolution::Missing`]. Everything here is fatal.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("parse error: {message} (path: {path}, line: {line:?})")]
    Parse {
        message: String,
        path: String,
        line: Option<u32>,
    },

    #[error("lookup error: {message} (module: {module})")]
    Lookup { message: String, module: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `InspectError`.
pub type Result<T> = std::result::Result<T, InspectError>;
