use crate::state::AppState;
use axum::Router;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
