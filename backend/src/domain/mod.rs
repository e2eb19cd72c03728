//! Domain primitives and ports.
//!
//! Types here are transport agnostic: inbound adapters translate them to
//! HTTP payloads, outbound adapters to store documents. Validation happens
//! at construction so handlers and repositories can rely on the invariants
//! documented on each type.

pub mod auth;
pub mod error;
pub mod ports;
pub mod task;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::task::{NewTask, Task, TaskChanges, TaskId, TaskIdError, DEFAULT_TASK_STATUS};
pub use self::user::{LoginCredentials, NewUser, Registration, UserRecord};
