//! Error kinds surfaced by the store, the loan engine and the persistence
//! layer. The `Display` text is what the shell prints, so keep it short and
//! user-facing.

use std::path::PathBuf;

use thiserror::Error;

/// Which entity a duplicate id collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Book,
    Member,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Book => f.write_str("Book"),
            EntityKind::Member => f.write_str("Member"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{entity} ID {id} already exists.")]
    DuplicateId { entity: EntityKind, id: i64 },

    #[error("Member {0} not found.")]
    MemberNotFound(i64),

    #[error("Book {0} not found.")]
    BookNotFound(i64),

    #[error("Book {0} is already borrowed.")]
    BookUnavailable(i64),

    #[error("Book {0} is not currently borrowed.")]
    NoActiveLoan(i64),

    /// The highest loan id in use has no successor.
    #[error("No loan id is left after {0}; return some books first.")]
    LoanIdsExhausted(i64),

    /// Only ever logged: the gateway falls back to an empty container.
    #[error("could not load {}: {source}", .path.display())]
    PersistenceRead {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("could not save {}: {source}", .path.display())]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LibraryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        LibraryError::InvalidInput(message.into())
    }

    pub(crate) fn read(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LibraryError::PersistenceRead {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn write(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LibraryError::PersistenceWrite {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;
