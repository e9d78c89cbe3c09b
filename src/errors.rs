use thiserror::Error;

/// Errors that can occur during context extraction.
///
/// Analysis gaps (parse failures, unresolved callee names, declaration key
/// collisions) are deliberately not represented here: they degrade in place
/// and never surface to the caller.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("scan error: {message} (path: {path})")]
    Scan { message: String, path: String },

    #[error("render error: {message}")]
    Render { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `ContextError`.
pub type Result<T> = std::result::Result<T, ContextError>;
