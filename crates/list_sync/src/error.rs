use thiserror::Error;

/// Errors that cross the list controller boundary. Backend failures never
/// show up here: they are absorbed by the fetch recovery path.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("action \"{name}\" not found in store")]
    ActionNotFound { name: String },
    #[error("key \"{key}\" is not tracked by this list")]
    UnknownKey { key: String },
    #[error("key \"{key}\" is not a sort key")]
    NotSortable { key: String },
    #[error("invalid pagination options in {path}: {message}")]
    Config { path: String, message: String },
}
