//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::net::SocketAddr;

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};

use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::tasks::{create_task, delete_task, get_task, list_tasks, update_task};
use backend::inbound::http::users::{login, register};
use backend::Trace;

#[cfg(debug_assertions)]
async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi as _;
    web::Json(backend::ApiDoc::openapi())
}

fn build_app(
    state: web::Data<HttpState>,
    health: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // The browser frontend is served from another origin; the contract keeps
    // CORS open to all origins.
    let cors = Cors::permissive();

    let app = App::new()
        .app_data(state)
        .app_data(health)
        .wrap(Trace)
        .wrap(cors)
        .service(register)
        .service(login)
        .service(list_tasks)
        .service(create_task)
        .service(get_task)
        .service(update_task)
        .service(delete_task)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.route("/api-docs/openapi.json", web::get().to(openapi_json));

    app
}

/// Construct the HTTP server and flip the readiness probe.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    state: HttpState,
    health: web::Data<HealthState>,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let server_health = health.clone();
    let server = HttpServer::new(move || build_app(state.clone(), server_health.clone()))
        .bind(bind_addr)?
        .run();

    // Dependencies are initialised by the time the server exists.
    health.mark_ready();
    Ok(server)
}
