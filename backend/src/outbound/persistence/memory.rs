//! In-memory implementations of the persistence ports.
//!
//! Used by handler and integration tests so the HTTP surface can be
//! exercised without a running document store. Iteration order is insertion
//! order, mirroring the natural order of an unindexed collection scan.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::domain::ports::{
    PersistenceError, TaskRepository, UpdateOutcome, UserRepository,
};
use crate::domain::{NewTask, NewUser, Task, TaskChanges, TaskId, UserRecord};

fn fresh_task_id() -> Result<TaskId, PersistenceError> {
    TaskId::parse(&ObjectId::new().to_hex())
        .map_err(|err| PersistenceError::corrupt(err.to_string()))
}

/// In-memory implementation of [`TaskRepository`].
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, PersistenceError> {
        Ok(self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn insert(&self, task: NewTask) -> Result<TaskId, PersistenceError> {
        let id = fresh_task_id()?;
        let stored = Task {
            id: id.clone(),
            text: task.text,
            description: task.description,
            completed: task.completed,
            status: task.status,
            due_date: task.due_date,
            created_at: Some(task.created_at),
            updated_at: Some(task.updated_at),
        };
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored);
        Ok(id)
    }

    async fn find(&self, id: &TaskId) -> Result<Option<Task>, PersistenceError> {
        Ok(self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|task| &task.id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<UpdateOutcome, PersistenceError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(task) = tasks.iter_mut().find(|task| &task.id == id) else {
            return Ok(UpdateOutcome {
                matched: false,
                modified: false,
            });
        };

        // Mirror the store's modified-count semantics: only report fields
        // whose value actually changed.
        let mut modified = false;
        if let Some(text) = changes.text {
            modified |= task.text != text;
            task.text = text;
        }
        if let Some(description) = changes.description {
            modified |= task.description != description;
            task.description = description;
        }
        if let Some(status) = changes.status {
            modified |= task.status != status;
            task.status = status;
        }
        if let Some(completed) = changes.completed {
            modified |= task.completed != completed;
            task.completed = completed;
        }
        if let Some(due_date) = changes.due_date {
            modified |= task.due_date != Some(due_date);
            task.due_date = Some(due_date);
        }
        if let Some(updated_at) = changes.updated_at {
            modified |= task.updated_at != Some(updated_at);
            task.updated_at = Some(updated_at);
        }

        Ok(UpdateOutcome {
            matched: true,
            modified,
        })
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, PersistenceError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        Ok(tasks.len() < before)
    }
}

/// In-memory implementation of [`UserRepository`].
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, PersistenceError> {
        Ok(self
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<String, PersistenceError> {
        let id = ObjectId::new().to_hex();
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(UserRecord {
                id: id.clone(),
                name: user.name,
                email: user.email,
                phone: user.phone,
                password_hash: user.password_hash,
                role: user.role,
                status: user.status,
            });
        Ok(id)
    }
}
