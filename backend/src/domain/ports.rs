//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with the document
//! store. Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants instead of returning opaque strings.

use async_trait::async_trait;
use thiserror::Error;

use super::task::{NewTask, Task, TaskChanges, TaskId};
use super::user::{NewUser, UserRecord};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Store connectivity failures.
    #[error("store connection failed: {message}")]
    Connection {
        /// Driver-supplied description.
        message: String,
    },
    /// Query or write failures that bubble up from the adapter.
    #[error("store operation failed: {message}")]
    Query {
        /// Driver-supplied description.
        message: String,
    },
    /// A stored document did not match the expected shape.
    #[error("stored document is malformed: {message}")]
    Corrupt {
        /// What was wrong with the document.
        message: String,
    },
}

impl PersistenceError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query and write failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for malformed stored documents.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Outcome of a field-level merge against a single record.
///
/// `matched` and `modified` are reported separately so the service can tell
/// "no such record" apart from "record exists but nothing changed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// A record with the given identity exists.
    pub matched: bool,
    /// At least one field value actually changed.
    pub modified: bool,
}

/// Port over the `users` collection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by exact email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, PersistenceError>;

    /// Insert a new user and return the store-assigned identity.
    async fn insert(&self, user: NewUser) -> Result<String, PersistenceError>;
}

/// Port over the `tasks` collection.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Return every task in store iteration order.
    async fn list(&self) -> Result<Vec<Task>, PersistenceError>;

    /// Insert a new task and return its identity.
    async fn insert(&self, task: NewTask) -> Result<TaskId, PersistenceError>;

    /// Fetch a single task by identity.
    async fn find(&self, id: &TaskId) -> Result<Option<Task>, PersistenceError>;

    /// Apply a field-level merge to the matching record.
    async fn update(
        &self,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<UpdateOutcome, PersistenceError>;

    /// Delete the matching record; `true` when a record was removed.
    async fn delete(&self, id: &TaskId) -> Result<bool, PersistenceError>;
}
