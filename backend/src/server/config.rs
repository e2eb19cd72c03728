//! Bootstrap configuration read from the environment.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use zeroize::Zeroizing;

/// Default listen address when `BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Signing secret used when `JWT_SECRET` is unset in debug builds. Release
/// builds refuse to start without an explicit secret.
#[cfg(debug_assertions)]
const DEV_JWT_SECRET: &[u8] = b"development-only-signing-secret";

/// Errors raised while assembling [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document store connection string is required.
    #[error("MONGO_URL not found in environment variables")]
    MissingMongoUrl,
    /// Release builds must be given a signing secret.
    #[error("JWT_SECRET not set; refusing to start without a signing secret")]
    MissingJwtSecret,
    /// The listen address did not parse.
    #[error("BIND_ADDR is not a valid socket address: {0}")]
    InvalidBindAddr(std::net::AddrParseError),
}

/// Application configuration resolved once at startup.
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Document store connection string, must name a default database.
    pub mongo_url: String,
    /// Token signing secret.
    pub jwt_secret: Zeroizing<Vec<u8>>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_url = env::var("MONGO_URL").map_err(|_| ConfigError::MissingMongoUrl)?;
        let jwt_secret = resolve_jwt_secret(env::var("JWT_SECRET").ok())?;
        let bind_addr = parse_bind_addr(env::var("BIND_ADDR").ok())?;
        Ok(Self {
            bind_addr,
            mongo_url,
            jwt_secret,
        })
    }
}

fn parse_bind_addr(raw: Option<String>) -> Result<SocketAddr, ConfigError> {
    raw.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
        .parse()
        .map_err(ConfigError::InvalidBindAddr)
}

#[cfg(debug_assertions)]
fn resolve_jwt_secret(raw: Option<String>) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    match raw {
        Some(secret) => Ok(Zeroizing::new(secret.into_bytes())),
        None => {
            tracing::warn!("JWT_SECRET not set; using a development-only signing secret");
            Ok(Zeroizing::new(DEV_JWT_SECRET.to_vec()))
        }
    }
}

#[cfg(not(debug_assertions))]
fn resolve_jwt_secret(raw: Option<String>) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    raw.map(|secret| Zeroizing::new(secret.into_bytes()))
        .ok_or(ConfigError::MissingJwtSecret)
}
