//! Event storage contract

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EventResult;
use crate::models::{
    Creator, Decision, Event, EventFilter, EventPatch, EventStatus, EventView, StatusGuard,
};

/// Repository trait for Event persistence
///
/// Mutations carry their own row predicate so that a permission decided on a
/// read still holds at write time; `None`/`false` means no row matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a new event
    async fn insert(&self, event: Event, creator: Creator) -> EventResult<EventView>;

    /// Get an event by ID with its creator
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<EventView>>;

    /// Events matching `filter`, by start date, start time, then creation
    async fn list(&self, filter: EventFilter) -> EventResult<Vec<EventView>>;

    /// Apply the present patch fields and refresh `updated_at`
    async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        guard: StatusGuard,
    ) -> EventResult<Option<EventView>>;

    /// Set status, approver and decision time while the event is still pending
    async fn record_decision(&self, id: Uuid, decision: Decision)
    -> EventResult<Option<EventView>>;

    /// Remove an event
    async fn delete(&self, id: Uuid, guard: StatusGuard) -> EventResult<bool>;
}

/// In-memory implementation of EventRepository (for development/testing)
///
/// Every mutation runs under one write lock, so guarded updates are atomic
/// the same way the single-statement Postgres updates are.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<Uuid, EventView>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn passes(guard: StatusGuard, event: &Event) -> bool {
    match guard {
        StatusGuard::Any => true,
        StatusGuard::Pending => event.status == EventStatus::Pending,
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert(&self, event: Event, creator: Creator) -> EventResult<EventView> {
        let view = EventView::new(event, creator);
        self.events.write().await.insert(view.event.id, view.clone());

        tracing::info!(event_id = %view.event.id, "Created event");
        Ok(view)
    }

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<EventView>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: EventFilter) -> EventResult<Vec<EventView>> {
        let events = self.events.read().await;

        let mut result: Vec<EventView> = events
            .values()
            .filter(|v| filter.matches(&v.event))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            (a.event.start_date, a.event.start_time, a.event.created_at, a.event.id).cmp(&(
                b.event.start_date,
                b.event.start_time,
                b.event.created_at,
                b.event.id,
            ))
        });

        Ok(result)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        guard: StatusGuard,
    ) -> EventResult<Option<EventView>> {
        let mut events = self.events.write().await;

        let Some(view) = events.get_mut(&id).filter(|v| passes(guard, &v.event)) else {
            return Ok(None);
        };

        patch.apply_to(&mut view.event);
        view.event.updated_at = Utc::now();
        Ok(Some(view.clone()))
    }

    async fn record_decision(
        &self,
        id: Uuid,
        decision: Decision,
    ) -> EventResult<Option<EventView>> {
        let mut events = self.events.write().await;

        let Some(view) = events
            .get_mut(&id)
            .filter(|v| v.event.status == EventStatus::Pending)
        else {
            return Ok(None);
        };

        view.event.status = decision.status;
        view.event.approved_by = Some(decision.approver);
        view.event.approved_at = Some(decision.at);
        view.event.updated_at = Utc::now();
        Ok(Some(view.clone()))
    }

    async fn delete(&self, id: Uuid, guard: StatusGuard) -> EventResult<bool> {
        let mut events = self.events.write().await;

        if events.get(&id).is_some_and(|v| passes(guard, &v.event)) {
            events.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
