//! Events Domain
//!
//! School calendar events that coordenadores submit and supervisors approve
//! or reject.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Event Lifecycle                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  create ──► pending ──┬── approve ──► approved               │
//! │                       │                                      │
//! │                       └── reject ───► rejected               │
//! │                                                              │
//! │  handlers ─► service ─► policy (who may act)                 │
//! │                  │                                           │
//! │                  └────► repository (guarded writes)          │
//! │                              ├─► PgEventRepository           │
//! │                              └─► InMemoryEventRepository     │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Approved and rejected are terminal. Owners edit or delete their own
//! events only while pending; supervisors may edit or delete any event.

use utoipa::OpenApi;

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{EventError, EventResult};
pub use handlers::{EVENTS_TAG, router};
pub use models::{
    CreateEvent, Creator, DateRange, Event, EventEnvelope, EventFilter, EventIdRequest,
    EventStatus, EventType, EventView, EventsEnvelope, MessageResponse, UpdateEvent,
};
pub use postgres::PgEventRepository;
pub use repository::{EventRepository, InMemoryEventRepository};
pub use service::EventService;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_events,
        handlers::list_my_events,
        handlers::list_approved_events,
        handlers::list_pending_events,
        handlers::get_event,
        handlers::create_event,
        handlers::update_event,
        handlers::delete_event,
        handlers::approve_event,
        handlers::reject_event,
    ),
    components(schemas(
        Event,
        EventView,
        EventType,
        EventStatus,
        CreateEvent,
        UpdateEvent,
        EventIdRequest,
        EventEnvelope,
        EventsEnvelope,
        MessageResponse,
    )),
    tags(
        (name = EVENTS_TAG, description = "Calendar events and their approval workflow")
    )
)]
pub struct ApiDoc;
