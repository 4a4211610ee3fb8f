use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// Server code for `E11000 duplicate key`.
pub const DUPLICATE_KEY: i32 = 11000;
/// Server code for `DocumentValidationFailure`.
pub const DOCUMENT_VALIDATION_FAILURE: i32 = 121;
/// Server code for `NamespaceExists`.
pub const NAMESPACE_EXISTS: i32 = 48;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("database error: {0}")]
    Mongo(#[from] MongoError),

    #[error("collection `{collection}` already exists with a different validator or validation policy")]
    CollectionConflict { collection: String },

    #[error("index `{name}` conflicts with an existing index: {reason}")]
    IndexConflict { name: String, reason: String },

    #[error("missing indexes: {}", .0.join(", "))]
    MissingIndexes(Vec<String>),
}

pub type SetupResult<T> = Result<T, SetupError>;

/// Server error code carried by a command or write failure, if any.
pub fn error_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(e) => Some(e.code),
        ErrorKind::Write(WriteFailure::WriteError(e)) => Some(e.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(e)) => Some(e.code),
        _ => None,
    }
}

pub fn is_duplicate_key(err: &MongoError) -> bool {
    error_code(err) == Some(DUPLICATE_KEY)
}

pub fn is_validation_failure(err: &MongoError) -> bool {
    error_code(err) == Some(DOCUMENT_VALIDATION_FAILURE)
}

pub fn is_namespace_exists(err: &MongoError) -> bool {
    error_code(err) == Some(NAMESPACE_EXISTS)
}
