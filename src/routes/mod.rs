use axum::Router;

use crate::state::AppState;

pub mod account;
pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/categories", categories::router())
}
