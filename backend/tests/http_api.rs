//! End-to-end coverage of the HTTP surface against in-memory repositories.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use backend::domain::auth::TokenIssuer;
use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::tasks::{create_task, delete_task, get_task, list_tasks, update_task};
use backend::inbound::http::users::{login, register};
use backend::outbound::persistence::{InMemoryTaskRepository, InMemoryUserRepository};
use backend::Trace;

const TEST_SECRET: &[u8] = b"integration signing secret";

fn state() -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryTaskRepository::default()),
        TokenIssuer::from_secret(TEST_SECRET),
    ))
}

async fn app(
    state: web::Data<HttpState>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    test::init_service(
        App::new()
            .app_data(state)
            .app_data(health)
            .wrap(Trace)
            .service(register)
            .service(login)
            .service(list_tasks)
            .service(create_task)
            .service(get_task)
            .service(update_task)
            .service(delete_task)
            .service(ready)
            .service(live),
    )
    .await
}

async fn post_json(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    uri: &str,
    body: Value,
) -> ServiceResponse {
    test::call_service(app, test::TestRequest::post().uri(uri).set_json(body).to_request()).await
}

#[actix_web::test]
async fn registration_is_unique_per_email() {
    let app = app(state()).await;
    let body = json!({
        "name": "Ada",
        "email": "ada@example.com",
        "phone": "555-0100",
        "password": "correct horse"
    });

    let first = post_json(&app, "/register", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(&app, "/register", body).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(second).await;
    assert_eq!(
        error.get("error").and_then(Value::as_str),
        Some("Email already registered")
    );
}

#[actix_web::test]
async fn login_succeeds_only_with_matching_credentials() {
    let app = app(state()).await;
    post_json(
        &app,
        "/register",
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "phone": "555-0100",
            "password": "correct horse"
        }),
    )
    .await;

    let ok = post_json(
        &app,
        "/login",
        json!({ "email": "ada@example.com", "password": "correct horse" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = test::read_body_json(ok).await;
    assert!(body.get("access_token").and_then(Value::as_str).is_some());
    assert_eq!(body.get("name").and_then(Value::as_str), Some("Ada"));

    let wrong = post_json(
        &app,
        "/login",
        json!({ "email": "ada@example.com", "password": "incorrect horse" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn created_tasks_start_uncompleted_with_equal_stamps() {
    let app = app(state()).await;
    let res = post_json(&app, "/api/tasks", json!({ "text": "buy milk" })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(res).await;

    assert_eq!(task.get("completed").and_then(Value::as_bool), Some(false));
    assert_eq!(task.get("status").and_then(Value::as_str), Some("Pending"));
    assert_eq!(task.get("created_at"), task.get("updated_at"));
    let due = task.get("dueDate").and_then(Value::as_str).expect("dueDate");
    assert!(due.ends_with('z'), "dueDate suffix: {due}");
    let created = task.get("created_at").and_then(Value::as_str).expect("created_at");
    assert!(created.ends_with('Z'), "created_at suffix: {created}");
}

#[actix_web::test]
async fn create_then_get_round_trips() {
    let app = app(state()).await;
    let res = post_json(
        &app,
        "/api/tasks",
        json!({ "text": "buy milk", "dueDate": "2024-05-01T10:00:00Z" }),
    )
    .await;
    let created: Value = test::read_body_json(res).await;
    let id = created.get("id").and_then(Value::as_str).expect("id");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/tasks/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn updates_advance_updated_at_and_preserve_other_fields() {
    let app = app(state()).await;
    let res = post_json(
        &app,
        "/api/tasks",
        json!({ "text": "buy milk", "description": "two pints" }),
    )
    .await;
    let created: Value = test::read_body_json(res).await;
    let id = created.get("id").and_then(Value::as_str).expect("id");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/tasks/{id}"))
            .set_json(json!({ "completed": true }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(res).await;

    assert_eq!(updated.get("completed").and_then(Value::as_bool), Some(true));
    assert_eq!(
        updated.get("description").and_then(Value::as_str),
        Some("two pints")
    );
    assert_eq!(updated.get("created_at"), created.get("created_at"));
    let before = created.get("updated_at").and_then(Value::as_str).expect("stamp");
    let after = updated.get("updated_at").and_then(Value::as_str).expect("stamp");
    assert!(after > before, "updated_at must advance: {before} -> {after}");
}

#[actix_web::test]
async fn deleted_tasks_are_gone() {
    let app = app(state()).await;
    let res = post_json(&app, "/api/tasks", json!({ "text": "buy milk" })).await;
    let created: Value = test::read_body_json(res).await;
    let id = created.get("id").and_then(Value::as_str).expect("id");

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/tasks/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/tasks/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let error: Value = test::read_body_json(res).await;
    assert_eq!(error.get("error").and_then(Value::as_str), Some("Task not found"));
}

#[actix_web::test]
async fn unknown_hex_id_yields_the_contractual_404_body() {
    let app = app(state()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/tasks/65f2a0c4b1d2e3f4a5b6c7d8")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let error: Value = test::read_body_json(res).await;
    assert_eq!(error, json!({ "error": "Task not found" }));
}

#[actix_web::test]
async fn responses_carry_a_trace_id_header() {
    let app = app(state()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/tasks").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("trace-id"));
}

#[actix_web::test]
async fn probes_report_health() {
    let app = app(state()).await;
    for uri in ["/health/ready", "/health/live"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
    }
}
