use axum::Router;
use domain_users::{PgUserRepository, UserService, handlers};
use std::sync::Arc;

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::users_router(user_service(state))
}

/// Account service over Postgres; shared by the auth and users routes
pub fn user_service(state: &crate::state::AppState) -> Arc<UserService<PgUserRepository>> {
    let repository = PgUserRepository::new(state.db.clone());
    let service = UserService::new(repository, state.jwt.clone())
        .with_supervisor_emails(state.config.auth.supervisor_emails.clone());
    Arc::new(service)
}
