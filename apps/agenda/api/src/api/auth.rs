use axum::Router;
use domain_users::handlers;

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::auth_router(super::users::user_service(state))
}
