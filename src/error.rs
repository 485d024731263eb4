use crate::models::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// Failure conditions surfaced by the sync engine and the read path.
///
/// The engine fails fast and never retries: after any error the stored
/// dataset is either fully old or fully new, never mixed. Translating these
/// conditions into user-facing signals is the caller's concern.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A fetch-phase network, status, or payload failure. No mutation was
    /// applied; the prior dataset is untouched.
    #[error("remote source unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    /// A fetched record is missing a required field or reuses another
    /// record's origin URL. Aborts the sync before the transaction begins.
    #[error("malformed {kind} record: {reason}")]
    MalformedRecord { kind: EntityKind, reason: String },

    /// A foreign reference points at an origin URL absent from the fetched
    /// dataset. Aborts the sync rather than silently dropping the edge.
    #[error("{kind} reference `{url}` does not match any fetched record")]
    DanglingReference { kind: EntityKind, url: String },

    /// A delete, insert, or commit failed. The transaction rolled back and
    /// the prior dataset remains intact.
    #[error("store operation failed: {0}")]
    Store(#[from] rusqlite::Error),

    /// Read path only: no stored entity has the requested identifier.
    #[error("{kind} with id `{id}` not found")]
    NotFound { kind: EntityKind, id: Uuid },
}

pub type Result<T> = std::result::Result<T, SyncError>;
