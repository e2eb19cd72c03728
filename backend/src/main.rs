//! Service entry point: configuration, store connection, HTTP bootstrap.

mod server;

use std::sync::Arc;

use actix_web::web;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::domain::auth::TokenIssuer;
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{self, MongoTaskRepository, MongoUserRepository};

use server::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    // A store that cannot be reached at startup is fatal.
    let database = persistence::connect(&config.mongo_url).await.map_err(|err| {
        error!(error = %err, "document store connection failed");
        std::io::Error::other(err)
    })?;
    info!("connected to document store");

    let state = HttpState::new(
        Arc::new(MongoUserRepository::new(&database)),
        Arc::new(MongoTaskRepository::new(&database)),
        TokenIssuer::from_secret(&config.jwt_secret),
    );
    let health = web::Data::new(HealthState::new());

    server::create_server(state, health, config.bind_addr)?.await
}
