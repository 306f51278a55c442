//! HTTP handlers for the events API

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, JwtAuth, QueryParams, UuidPath, ValidatedJson, jwt_auth_middleware,
};
use domain_users::{CurrentUser, Identity};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{
    CreateEvent, DateRange, EventEnvelope, EventIdRequest, EventsEnvelope, MessageResponse,
    UpdateEvent,
};
use crate::repository::EventRepository;
use crate::service::EventService;

pub const EVENTS_TAG: &str = "events";

/// Events router state
pub type EventsState<R> = Arc<EventService<R>>;

/// `/events` routes, all behind the JWT middleware
pub fn router<R: EventRepository + 'static>(service: EventsState<R>, jwt: JwtAuth) -> Router {
    Router::new()
        .route("/", get(list_events::<R>))
        .route("/my-events", get(list_my_events::<R>))
        .route("/approved", get(list_approved_events::<R>))
        .route("/pending", get(list_pending_events::<R>))
        .route("/create", post(create_event::<R>))
        .route("/approve", post(approve_event::<R>))
        .route("/reject", post(reject_event::<R>))
        .route(
            "/{id}",
            get(get_event::<R>)
                .put(update_event::<R>)
                .delete(delete_event::<R>),
        )
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(service)
}

fn audit_outcome<T>(result: &EventResult<T>) -> AuditOutcome {
    match result {
        Ok(_) => AuditOutcome::Success,
        Err(EventError::Unauthorized(_)) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    }
}

fn audit<T>(
    action: &str,
    actor: &Identity,
    id: Option<Uuid>,
    headers: &HeaderMap,
    result: &EventResult<T>,
) {
    let mut entry = AuditEvent::new(action, audit_outcome(result))
        .user(actor.user_id)
        .from_headers(headers);
    if let Some(id) = id {
        entry = entry.resource("event", id);
    }
    if let Err(err) = result {
        entry = entry.with_details(json!({ "reason": err.to_string() }));
    }
    entry.log();
}

/// List every event (supervisor only)
#[utoipa::path(
    get,
    path = "",
    tag = EVENTS_TAG,
    params(DateRange),
    responses(
        (status = 200, description = "All events", body = EventsEnvelope),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a supervisor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_events<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    QueryParams(range): QueryParams<DateRange>,
) -> EventResult<Json<EventsEnvelope>> {
    let events = service.list_all(&identity, range).await?;
    Ok(Json(EventsEnvelope { events }))
}

/// List the caller's own events
#[utoipa::path(
    get,
    path = "/my-events",
    tag = EVENTS_TAG,
    params(DateRange),
    responses(
        (status = 200, description = "Caller's events in any status", body = EventsEnvelope),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_events<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    QueryParams(range): QueryParams<DateRange>,
) -> EventResult<Json<EventsEnvelope>> {
    let events = service.list_mine(&identity, range).await?;
    Ok(Json(EventsEnvelope { events }))
}

/// List approved events
#[utoipa::path(
    get,
    path = "/approved",
    tag = EVENTS_TAG,
    params(DateRange),
    responses(
        (status = 200, description = "Approved events", body = EventsEnvelope),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_approved_events<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(_identity): CurrentUser,
    QueryParams(range): QueryParams<DateRange>,
) -> EventResult<Json<EventsEnvelope>> {
    let events = service.list_approved(range).await?;
    Ok(Json(EventsEnvelope { events }))
}

/// List events awaiting a decision (supervisor only)
#[utoipa::path(
    get,
    path = "/pending",
    tag = EVENTS_TAG,
    responses(
        (status = 200, description = "Pending events", body = EventsEnvelope),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a supervisor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_pending_events<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
) -> EventResult<Json<EventsEnvelope>> {
    let events = service.list_pending(&identity).await?;
    Ok(Json(EventsEnvelope { events }))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = EVENTS_TAG,
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = EventEnvelope),
        (status = 403, description = "Event is not visible to the caller"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_event<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<EventEnvelope>> {
    let event = service.get(&identity, id).await?;
    Ok(Json(EventEnvelope { event }))
}

/// Submit a new event for approval
#[utoipa::path(
    post,
    path = "/create",
    tag = EVENTS_TAG,
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created as pending", body = EventEnvelope),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateEvent>,
) -> EventResult<impl IntoResponse> {
    let result = service.create(&identity, input).await;
    audit(
        "event.create",
        &identity,
        result.as_ref().ok().map(|v| v.event.id),
        &headers,
        &result,
    );

    let event = result?;
    Ok((StatusCode::CREATED, Json(EventEnvelope { event })))
}

/// Update event fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = EVENTS_TAG,
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEvent,
    responses(
        (status = 200, description = "Event updated", body = EventEnvelope),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller may not edit this event"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_event<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateEvent>,
) -> EventResult<Json<EventEnvelope>> {
    let result = service.update(&identity, id, input).await;
    audit("event.update", &identity, Some(id), &headers, &result);

    Ok(Json(EventEnvelope { event: result? }))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = EVENTS_TAG,
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 403, description = "Caller may not delete this event"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> EventResult<Json<MessageResponse>> {
    let result = service.delete(&identity, id).await;
    audit("event.delete", &identity, Some(id), &headers, &result);

    result?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// Approve a pending event (supervisor only)
#[utoipa::path(
    post,
    path = "/approve",
    tag = EVENTS_TAG,
    request_body = EventIdRequest,
    responses(
        (status = 200, description = "Event approved", body = EventEnvelope),
        (status = 403, description = "Caller is not a supervisor"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event was already decided")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_event<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<EventIdRequest>,
) -> EventResult<Json<EventEnvelope>> {
    let result = service.approve(&identity, input.event_id).await;
    audit("event.approve", &identity, Some(input.event_id), &headers, &result);

    Ok(Json(EventEnvelope { event: result? }))
}

/// Reject a pending event (supervisor only)
#[utoipa::path(
    post,
    path = "/reject",
    tag = EVENTS_TAG,
    request_body = EventIdRequest,
    responses(
        (status = 200, description = "Event rejected", body = EventEnvelope),
        (status = 403, description = "Caller is not a supervisor"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event was already decided")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_event<R: EventRepository>(
    State(service): State<EventsState<R>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<EventIdRequest>,
) -> EventResult<Json<EventEnvelope>> {
    let result = service.reject(&identity, input.event_id).await;
    audit("event.reject", &identity, Some(input.event_id), &headers, &result);

    Ok(Json(EventEnvelope { event: result? }))
}
