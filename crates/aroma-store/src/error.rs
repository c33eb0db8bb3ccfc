use std::fmt::Display;

use thiserror::Error;

/// Errors produced by the store layer.
///
/// Repository operations surface exactly three kinds: [`InvalidArgument`]
/// (input rejected before any I/O), the not-found kinds ([`DoesNotExist`] /
/// [`InvalidToken`]), and [`OperationFailed`] (everything else the store can
/// throw, wrapped with the repository and operation that hit it).  The
/// remaining variants only occur while opening or migrating a database.
///
/// [`InvalidArgument`]: StoreError::InvalidArgument
/// [`DoesNotExist`]: StoreError::DoesNotExist
/// [`InvalidToken`]: StoreError::InvalidToken
/// [`OperationFailed`]: StoreError::OperationFailed
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input failed validation; no statement was issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A single-row lookup legitimately found nothing.
    #[error("{entity} does not exist")]
    DoesNotExist { entity: &'static str },

    /// Token lookups report missing rows as an invalid token rather than a
    /// generic not-found.
    #[error("token is invalid or expired")]
    InvalidToken,

    /// Catch-all for unexpected store failures (constraint violations,
    /// driver errors, malformed writes).  Details are logged before this is
    /// returned; callers only see the flattened kind.
    #[error("{repository}.{operation} failed")]
    OperationFailed {
        repository: &'static str,
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite error raised outside a repository operation (open, pragma).
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Normalize an unexpected store failure into [`StoreError::OperationFailed`],
/// logging the repository, operation and key first so the detail is not lost.
///
/// Every repository funnels its failures through here; none of them build the
/// variant by hand.
pub(crate) fn operation_failed(
    repository: &'static str,
    operation: &'static str,
    key: &dyn Display,
    source: rusqlite::Error,
) -> StoreError {
    tracing::error!(
        repository,
        operation,
        key = %key,
        error = %source,
        "store operation failed"
    );
    StoreError::OperationFailed {
        repository,
        operation,
        source,
    }
}

/// Closure form of [`operation_failed`] for `map_err` call sites.
pub(crate) fn op<'a>(
    repository: &'static str,
    operation: &'static str,
    key: &'a dyn Display,
) -> impl FnOnce(rusqlite::Error) -> StoreError + 'a {
    move |source| operation_failed(repository, operation, key, source)
}

/// Normalize the outcome of a single-row query: an empty result becomes the
/// entity-specific not-found error, anything else an operation failure.
pub(crate) fn single_row(
    repository: &'static str,
    operation: &'static str,
    key: &dyn Display,
    not_found: StoreError,
    source: rusqlite::Error,
) -> StoreError {
    match source {
        rusqlite::Error::QueryReturnedNoRows => not_found,
        other => operation_failed(repository, operation, key, other),
    }
}

/// The not-found error for a regular entity.
pub(crate) fn does_not_exist(entity: &'static str) -> StoreError {
    StoreError::DoesNotExist { entity }
}
