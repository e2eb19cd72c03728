//! MongoDB adapters for the persistence ports.
//!
//! Documents written by earlier versions of this service may carry ISO-8601
//! strings where newer writes store native BSON datetimes; deserialization
//! accepts both so reads normalize identically.

mod memory;

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};

use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures_util::stream::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    PersistenceError, TaskRepository, UpdateOutcome, UserRepository,
};
use crate::domain::{NewTask, NewUser, Task, TaskChanges, TaskId, UserRecord, DEFAULT_TASK_STATUS};

const USERS_COLLECTION: &str = "users";
const TASKS_COLLECTION: &str = "tasks";

/// How long the driver may search for a reachable server before the startup
/// ping fails.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Establish the store connection and verify it with a ping.
///
/// The connection string must name a default database. Startup is expected
/// to treat any error here as fatal.
pub async fn connect(url: &str) -> Result<Database, PersistenceError> {
    let mut options = ClientOptions::parse(url)
        .await
        .map_err(|err| PersistenceError::connection(err.to_string()))?;
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    let client =
        Client::with_options(options).map_err(|err| PersistenceError::connection(err.to_string()))?;
    let database = client.default_database().ok_or_else(|| {
        PersistenceError::connection("connection string does not name a default database")
    })?;
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|err| PersistenceError::connection(err.to_string()))?;
    Ok(database)
}

fn query_error(err: mongodb::error::Error) -> PersistenceError {
    PersistenceError::query(err.to_string())
}

fn default_task_status() -> String {
    DEFAULT_TASK_STATUS.to_owned()
}

/// Accept a stored timestamp as either a native BSON datetime or an
/// ISO-8601 string, with or without the trailing `z`/`Z` this service emits.
fn flexible_datetime<'de, D>(deserializer: D) -> Result<Option<bson::DateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<Bson>::deserialize(deserializer)? {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::DateTime(stamp)) => Ok(Some(stamp)),
        Some(Bson::String(raw)) => parse_stored_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unparseable stored timestamp: {raw:?}"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected datetime or string, got {other:?}"
        ))),
    }
}

fn parse_stored_timestamp(raw: &str) -> Option<bson::DateTime> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(bson::DateTime::from_chrono(parsed.with_timezone(&chrono::Utc)));
    }
    let trimmed = raw.strip_suffix(['z', 'Z']).unwrap_or(raw);
    chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| bson::DateTime::from_chrono(naive.and_utc()))
}

/// Stored shape of a task document.
#[derive(Debug, Serialize, Deserialize)]
struct TaskDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    text: String,
    #[serde(default)]
    description: String,
    completed: bool,
    #[serde(default = "default_task_status")]
    status: String,
    #[serde(
        rename = "dueDate",
        default,
        deserialize_with = "flexible_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    due_date: Option<bson::DateTime>,
    #[serde(
        default,
        deserialize_with = "flexible_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    created_at: Option<bson::DateTime>,
    #[serde(
        default,
        deserialize_with = "flexible_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    updated_at: Option<bson::DateTime>,
}

impl TaskDocument {
    fn from_new(task: NewTask) -> Self {
        Self {
            id: None,
            text: task.text,
            description: task.description,
            completed: task.completed,
            status: task.status,
            due_date: task.due_date.map(bson::DateTime::from_chrono),
            created_at: Some(bson::DateTime::from_chrono(task.created_at)),
            updated_at: Some(bson::DateTime::from_chrono(task.updated_at)),
        }
    }

    fn into_task(self) -> Result<Task, PersistenceError> {
        let oid = self
            .id
            .ok_or_else(|| PersistenceError::corrupt("task document missing _id"))?;
        let id = TaskId::parse(&oid.to_hex())
            .map_err(|err| PersistenceError::corrupt(err.to_string()))?;
        Ok(Task {
            id,
            text: self.text,
            description: self.description,
            completed: self.completed,
            status: self.status,
            due_date: self.due_date.map(bson::DateTime::to_chrono),
            created_at: self.created_at.map(bson::DateTime::to_chrono),
            updated_at: self.updated_at.map(bson::DateTime::to_chrono),
        })
    }
}

fn object_id(id: &TaskId) -> Result<ObjectId, PersistenceError> {
    ObjectId::parse_str(id.as_str()).map_err(|err| PersistenceError::corrupt(err.to_string()))
}

fn set_document(changes: TaskChanges) -> Document {
    let mut set = Document::new();
    if let Some(text) = changes.text {
        set.insert("text", text);
    }
    if let Some(description) = changes.description {
        set.insert("description", description);
    }
    if let Some(status) = changes.status {
        set.insert("status", status);
    }
    if let Some(completed) = changes.completed {
        set.insert("completed", completed);
    }
    if let Some(due_date) = changes.due_date {
        set.insert("dueDate", bson::DateTime::from_chrono(due_date));
    }
    if let Some(updated_at) = changes.updated_at {
        set.insert("updated_at", bson::DateTime::from_chrono(updated_at));
    }
    set
}

/// MongoDB-backed implementation of [`TaskRepository`].
#[derive(Clone)]
pub struct MongoTaskRepository {
    collection: Collection<TaskDocument>,
}

impl MongoTaskRepository {
    /// Bind the adapter to the `tasks` collection of the given database.
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(TASKS_COLLECTION),
        }
    }
}

#[async_trait]
impl TaskRepository for MongoTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, PersistenceError> {
        let cursor = self.collection.find(doc! {}).await.map_err(query_error)?;
        let documents: Vec<TaskDocument> = cursor.try_collect().await.map_err(query_error)?;
        documents.into_iter().map(TaskDocument::into_task).collect()
    }

    async fn insert(&self, task: NewTask) -> Result<TaskId, PersistenceError> {
        let result = self
            .collection
            .insert_one(TaskDocument::from_new(task))
            .await
            .map_err(query_error)?;
        match result.inserted_id {
            Bson::ObjectId(oid) => TaskId::parse(&oid.to_hex())
                .map_err(|err| PersistenceError::corrupt(err.to_string())),
            other => Err(PersistenceError::corrupt(format!(
                "unexpected inserted id: {other:?}"
            ))),
        }
    }

    async fn find(&self, id: &TaskId) -> Result<Option<Task>, PersistenceError> {
        let document = self
            .collection
            .find_one(doc! { "_id": object_id(id)? })
            .await
            .map_err(query_error)?;
        document.map(TaskDocument::into_task).transpose()
    }

    async fn update(
        &self,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<UpdateOutcome, PersistenceError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": object_id(id)? },
                doc! { "$set": set_document(changes) },
            )
            .await
            .map_err(query_error)?;
        Ok(UpdateOutcome {
            matched: result.matched_count > 0,
            modified: result.modified_count > 0,
        })
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, PersistenceError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": object_id(id)? })
            .await
            .map_err(query_error)?;
        Ok(result.deleted_count > 0)
    }
}

/// Stored shape of a user document. The hash lives under the legacy
/// `password` field name so existing collections keep working.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(rename = "password")]
    password_hash: String,
    role: String,
    status: String,
}

impl UserDocument {
    fn from_new(user: NewUser) -> Self {
        Self {
            id: None,
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role: user.role,
            status: user.status,
        }
    }

    fn into_record(self) -> Result<UserRecord, PersistenceError> {
        let oid = self
            .id
            .ok_or_else(|| PersistenceError::corrupt("user document missing _id"))?;
        Ok(UserRecord {
            id: oid.to_hex(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            role: self.role,
            status: self.status,
        })
    }
}

/// MongoDB-backed implementation of [`UserRepository`].
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// Bind the adapter to the `users` collection of the given database.
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, PersistenceError> {
        let document = self
            .collection
            .find_one(doc! { "email": email })
            .await
            .map_err(query_error)?;
        document.map(UserDocument::into_record).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<String, PersistenceError> {
        let result = self
            .collection
            .insert_one(UserDocument::from_new(user))
            .await
            .map_err(query_error)?;
        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(oid.to_hex()),
            other => Err(PersistenceError::corrupt(format!(
                "unexpected inserted id: {other:?}"
            ))),
        }
    }
}
