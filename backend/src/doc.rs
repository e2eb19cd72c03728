//! OpenAPI documentation configuration.
//!
//! The generated document is served at `/api-docs/openapi.json` in debug
//! builds for use by external tooling.

use utoipa::OpenApi;

use crate::inbound::http::tasks::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task service API",
        description = "HTTP interface for user registration, login, and task CRUD."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::tasks::list_tasks,
        crate::inbound::http::tasks::create_task,
        crate::inbound::http::tasks::get_task,
        crate::inbound::http::tasks::update_task,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        CreateTaskRequest,
        UpdateTaskRequest,
        TaskResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "tasks", description = "Task CRUD"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
