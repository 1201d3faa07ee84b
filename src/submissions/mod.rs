use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod services;
pub mod store;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::submit_routes())
}
