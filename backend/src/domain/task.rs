//! Task aggregate, identifiers, and typed change sets.
//!
//! Task records are schema-light in the store; the types here pin down the
//! fields the service understands and who is allowed to write them. The
//! server owns `completed` at creation time and both audit stamps; callers
//! never set `created_at` after the fact.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Status assigned to tasks created without an explicit one.
pub const DEFAULT_TASK_STATUS: &str = "Pending";

/// Validated task identifier: the 24-character hex encoding the store uses
/// for object identities.
///
/// # Examples
/// ```
/// use backend::domain::TaskId;
///
/// let id = TaskId::parse("65f2a0c4b1d2e3f4a5b6c7d8").unwrap();
/// assert_eq!(id.as_str(), "65f2a0c4b1d2e3f4a5b6c7d8");
/// assert!(TaskId::parse("not-an-id").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

/// Validation error returned when parsing a [`TaskId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskIdError {
    /// Input is not a 24-character hexadecimal string.
    #[error("task id must be a 24-character hex string")]
    Malformed,
}

impl TaskId {
    /// Parse an identifier from its canonical hex encoding.
    pub fn parse(raw: &str) -> Result<Self, TaskIdError> {
        if raw.len() == 24 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(TaskIdError::Malformed)
        }
    }

    /// Borrow the hex encoding.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted task record as read back from the store.
///
/// Audit stamps are optional because documents written by earlier versions
/// of the system may lack them; serialization defaults missing stamps to the
/// read instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Store-assigned identity.
    pub id: TaskId,
    /// Required task text.
    pub text: String,
    /// Free-form description, empty when unset.
    pub description: String,
    /// Completion flag, forced to `false` on creation.
    pub completed: bool,
    /// Workflow status label.
    pub status: String,
    /// Optional caller-supplied due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Creation stamp, immutable after insert.
    pub created_at: Option<DateTime<Utc>>,
    /// Last-modification stamp, refreshed on every update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields persisted when creating a task.
///
/// Constructed via [`NewTask::new`], which stamps the server-owned fields so
/// a caller cannot submit `completed = true` or backdated audit stamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    /// Required task text.
    pub text: String,
    /// Free-form description.
    pub description: String,
    /// Workflow status label.
    pub status: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Always `false` at creation.
    pub completed: bool,
    /// Creation stamp.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` at creation.
    pub updated_at: DateTime<Utc>,
}

impl NewTask {
    /// Assemble a new task, stamping the server-owned fields.
    pub fn new(
        text: String,
        description: String,
        status: String,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            text,
            description,
            status,
            due_date,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field-level merge applied by the update operation.
///
/// `None` leaves the stored field untouched. There is deliberately no
/// `created_at` here: the creation stamp is immutable by contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    /// Replacement task text.
    pub text: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement status label.
    pub status: Option<String>,
    /// Replacement due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
    /// Refreshed by the service on every update before the merge runs.
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for identifiers and creation stamping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("65f2a0c4b1d2e3f4a5b6c7d8")]
    #[case("000000000000000000000000")]
    #[case("FFFFFFFFFFFFFFFFFFFFFFFF")]
    fn accepts_24_hex_identifiers(#[case] raw: &str) {
        let id = TaskId::parse(raw).expect("valid id");
        assert_eq!(id.as_str(), raw.to_ascii_lowercase());
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("65f2a0c4b1d2e3f4a5b6c7d")]
    #[case("65f2a0c4b1d2e3f4a5b6c7d8a")]
    #[case("zzzzzzzzzzzzzzzzzzzzzzzz")]
    fn rejects_malformed_identifiers(#[case] raw: &str) {
        assert_eq!(TaskId::parse(raw), Err(TaskIdError::Malformed));
    }

    #[test]
    fn creation_forces_server_owned_fields() {
        let now = Utc::now();
        let task = NewTask::new("buy milk".into(), String::new(), DEFAULT_TASK_STATUS.into(), None, now);
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.status, "Pending");
    }
}
