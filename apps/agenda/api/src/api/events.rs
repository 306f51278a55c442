use axum::Router;
use domain_events::{EventService, PgEventRepository, handlers};
use std::sync::Arc;

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgEventRepository::new(state.db.clone());
    let service = EventService::new(repository);
    handlers::router(Arc::new(service), state.jwt.clone())
}
