//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and remain testable without a live store.

use std::sync::Arc;

use crate::domain::auth::TokenIssuer;
use crate::domain::ports::{TaskRepository, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Port over the `users` collection.
    pub users: Arc<dyn UserRepository>,
    /// Port over the `tasks` collection.
    pub tasks: Arc<dyn TaskRepository>,
    /// Issues access tokens at login.
    pub tokens: TokenIssuer,
}

impl HttpState {
    /// Construct state from the repository ports and token issuer.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens,
        }
    }
}
