//! Error taxonomy for the storage core
//!
//! The object database, the index and the tree/history algorithms report
//! failures through [`Error`]. Callers that only care about the broad class of
//! a failure (e.g. "was it missing?") should match on [`Error::kind`], which
//! looks through the context wrappers added by the tree builder and the
//! history walker.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("ref not found: {0}")]
    RefNotFound(String),
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },
    #[error("corrupt index: {0}")]
    CorruptIndex(String),
    #[error("corrupt repository data: {0}")]
    Corrupt(String),
    #[error("index checksum does not match the value stored on disk")]
    ChecksumMismatch,
    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),
    #[error("invalid object hash: {0:?}")]
    InvalidHash(String),
    #[error("nothing to commit (the index is empty)")]
    EmptyStaging,
    #[error("path is outside the repository: {}", .0.display())]
    PathEscape(PathBuf),
    #[error("path is too long for an index entry: {0}")]
    PathTooLong(String),
    #[error("cannot stage {}: {reason}", path.display())]
    UnsupportedFile { path: PathBuf, reason: String },
    #[error("not a repository (or any of the parent directories): {}", .0.display())]
    NotARepository(PathBuf),
    #[error("failed to build tree for '{path}'")]
    TreeBuild {
        path: String,
        #[source]
        source: Box<Error>,
    },
    #[error("history walk failed at commit {oid}")]
    HistoryWalk {
        oid: ObjectId,
        #[source]
        source: Box<Error>,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Corrupt,
    ChecksumMismatch,
    UnsupportedVersion,
    InvalidHash,
    EmptyStaging,
    PathEscape,
    InvalidPath,
    NotARepository,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ObjectNotFound(_) | Error::RefNotFound(_) => ErrorKind::NotFound,
            Error::CorruptObject { .. } | Error::CorruptIndex(_) | Error::Corrupt(_) => {
                ErrorKind::Corrupt
            }
            Error::ChecksumMismatch => ErrorKind::ChecksumMismatch,
            Error::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            Error::InvalidHash(_) => ErrorKind::InvalidHash,
            Error::EmptyStaging => ErrorKind::EmptyStaging,
            Error::PathEscape(_) => ErrorKind::PathEscape,
            Error::PathTooLong(_) | Error::UnsupportedFile { .. } => ErrorKind::InvalidPath,
            Error::NotARepository(_) => ErrorKind::NotARepository,
            Error::TreeBuild { source, .. } | Error::HistoryWalk { source, .. } => source.kind(),
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn corrupt_object(oid: &ObjectId, reason: impl Into<String>) -> Self {
        Error::CorruptObject {
            oid: oid.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt_index(reason: impl Into<String>) -> Self {
        Error::CorruptIndex(reason.into())
    }
}
