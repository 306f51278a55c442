//! Event service layer
//!
//! Every operation loads the event, asks [`policy`](crate::policy) whether the
//! caller may proceed, then hands the store a guarded write. When a guarded
//! write matches nothing the event changed in between; the service re-reads
//! it once to report the right error.

use chrono::Utc;
use domain_users::Identity;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{
    CreateEvent, Creator, DateRange, Decision, Event, EventFilter, EventPatch, EventStatus,
    EventView, UpdateEvent,
};
use crate::policy;
use crate::repository::EventRepository;

/// Event service coordinating policy and storage
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a pending event owned by the caller
    #[instrument(skip_all, fields(user_id = %actor.user_id))]
    pub async fn create(&self, actor: &Identity, input: CreateEvent) -> EventResult<EventView> {
        let event = Event::new(input, actor.user_id);
        event.check_invariants().map_err(EventError::Validation)?;

        let creator = Creator {
            name: actor.name.clone(),
            email: actor.email.clone(),
        };
        let view = self.repository.insert(event, creator).await?;

        info!(event_id = %view.event.id, "Event submitted for approval");
        Ok(view)
    }

    /// Single event, if the caller may see it
    pub async fn get(&self, actor: &Identity, id: Uuid) -> EventResult<EventView> {
        let view = self.load(id).await?;
        policy::can_read(actor, &view.event)?;
        Ok(view)
    }

    /// Caller's own events in any status
    pub async fn list_mine(
        &self,
        actor: &Identity,
        range: DateRange,
    ) -> EventResult<Vec<EventView>> {
        check_range(&range)?;
        let filter = EventFilter {
            owner: Some(actor.user_id),
            ..Default::default()
        };
        self.repository.list(filter.with_range(range)).await
    }

    /// Approved events, visible to every authenticated user
    pub async fn list_approved(&self, range: DateRange) -> EventResult<Vec<EventView>> {
        check_range(&range)?;
        let filter = EventFilter {
            status: Some(EventStatus::Approved),
            ..Default::default()
        };
        self.repository.list(filter.with_range(range)).await
    }

    /// Approval queue (supervisor only)
    pub async fn list_pending(&self, actor: &Identity) -> EventResult<Vec<EventView>> {
        policy::can_list_pending(actor)?;
        let filter = EventFilter {
            status: Some(EventStatus::Pending),
            ..Default::default()
        };
        self.repository.list(filter).await
    }

    /// Every event in any status (supervisor only)
    pub async fn list_all(
        &self,
        actor: &Identity,
        range: DateRange,
    ) -> EventResult<Vec<EventView>> {
        policy::can_list_all(actor)?;
        check_range(&range)?;
        self.repository
            .list(EventFilter::default().with_range(range))
            .await
    }

    /// Partial update
    #[instrument(skip_all, fields(user_id = %actor.user_id))]
    pub async fn update(
        &self,
        actor: &Identity,
        id: Uuid,
        input: UpdateEvent,
    ) -> EventResult<EventView> {
        let mut patch = EventPatch::from(input);
        if patch.title.as_deref().is_some_and(str::is_empty) {
            return Err(EventError::Validation("Title cannot be empty".to_string()));
        }
        patch.check_ordering().map_err(EventError::Validation)?;

        let current = self.load(id).await?;
        let guard = policy::can_update(actor, &current.event)?;

        let mut merged = current.event.clone();
        patch.apply_to(&mut merged);
        if merged.all_day {
            patch.clear_times();
            merged.start_time = None;
            merged.end_time = None;
        }
        merged.check_invariants().map_err(EventError::Validation)?;

        match self.repository.update(id, patch, guard).await? {
            Some(view) => {
                info!(event_id = %id, "Event updated");
                Ok(view)
            }
            None => Err(self.resolve_miss(actor, id, policy::can_update).await),
        }
    }

    /// Remove an event
    #[instrument(skip_all, fields(user_id = %actor.user_id, event_id = %id))]
    pub async fn delete(&self, actor: &Identity, id: Uuid) -> EventResult<()> {
        let current = self.load(id).await?;
        let guard = policy::can_delete(actor, &current.event)?;

        if self.repository.delete(id, guard).await? {
            info!(event_id = %id, "Event deleted");
            Ok(())
        } else {
            Err(self.resolve_miss(actor, id, policy::can_delete).await)
        }
    }

    /// Approve a pending event (supervisor only)
    pub async fn approve(&self, actor: &Identity, id: Uuid) -> EventResult<EventView> {
        self.decide(actor, id, EventStatus::Approved).await
    }

    /// Reject a pending event (supervisor only)
    pub async fn reject(&self, actor: &Identity, id: Uuid) -> EventResult<EventView> {
        self.decide(actor, id, EventStatus::Rejected).await
    }

    #[instrument(skip_all, fields(user_id = %actor.user_id, event_id = %id))]
    async fn decide(
        &self,
        actor: &Identity,
        id: Uuid,
        status: EventStatus,
    ) -> EventResult<EventView> {
        let current = self.load(id).await?;
        policy::can_decide(actor, &current.event)?;

        let decision = Decision {
            status,
            approver: actor.user_id,
            at: Utc::now(),
        };

        match self.repository.record_decision(id, decision).await? {
            Some(view) => {
                info!(event_id = %id, status = %status, "Event decided");
                Ok(view)
            }
            None => Err(self.resolve_miss(actor, id, policy::can_decide).await),
        }
    }

    async fn load(&self, id: Uuid) -> EventResult<EventView> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// Error for a guarded write that matched no row
    async fn resolve_miss<T>(
        &self,
        actor: &Identity,
        id: Uuid,
        check: impl Fn(&Identity, &Event) -> EventResult<T>,
    ) -> EventError {
        let view = match self.repository.get_by_id(id).await {
            Ok(Some(view)) => view,
            Ok(None) => return EventError::NotFound(id),
            Err(err) => return err,
        };

        match check(actor, &view.event) {
            Err(err) => err,
            Ok(_) => EventError::InvalidTransition {
                id,
                status: view.event.status,
            },
        }
    }
}

fn check_range(range: &DateRange) -> EventResult<()> {
    match (range.from, range.to) {
        (Some(from), Some(to)) if from > to => Err(EventError::Validation(
            "from must be on or before to".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use crate::repository::{InMemoryEventRepository, MockEventRepository};
    use chrono::{NaiveDate, NaiveTime};
    use domain_users::Role;

    fn identity(name: &str, role: Role) -> Identity {
        Identity {
            user_id: Uuid::now_v7(),
            email: format!("{}@escola.org", name.to_lowercase()),
            name: name.to_string(),
            role,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn workshop() -> CreateEvent {
        CreateEvent {
            title: "Workshop".to_string(),
            event_type: EventType::Formacao,
            start_date: date(10),
            end_date: date(10),
            all_day: false,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(11, 0, 0),
            description: None,
        }
    }

    fn service() -> EventService<InMemoryEventRepository> {
        EventService::new(InMemoryEventRepository::new())
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_creator() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);

        let view = svc.create(&ana, workshop()).await.unwrap();
        assert_eq!(view.event.created_by, ana.user_id);
        assert_eq!(view.event.status, EventStatus::Pending);
        assert_eq!(view.creator_name, "Ana");
        assert_eq!(view.creator_email, "ana@escola.org");
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_dates() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);

        let mut input = workshop();
        input.end_date = date(9);
        let result = svc.create(&ana, input).await;
        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_then_get_preserves_client_fields() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);
        let bruno = identity("Bruno", Role::Supervisor);

        let input = CreateEvent {
            title: "Expedição ao museu".to_string(),
            event_type: EventType::ExpedicaoPedagogica,
            start_date: date(14),
            end_date: date(15),
            all_day: false,
            start_time: NaiveTime::from_hms_opt(8, 30, 0),
            end_time: NaiveTime::from_hms_opt(17, 45, 30),
            description: Some("Saída às 8h30 do portão principal".to_string()),
        };
        let created = svc.create(&ana, input.clone()).await.unwrap();

        for reader in [&ana, &bruno] {
            let fetched = svc.get(reader, created.event.id).await.unwrap();
            assert_eq!(fetched, created);

            let event = fetched.event;
            assert_eq!(event.title, input.title);
            assert_eq!(event.event_type, input.event_type);
            assert_eq!(event.start_date, input.start_date);
            assert_eq!(event.end_date, input.end_date);
            assert_eq!(event.all_day, input.all_day);
            assert_eq!(event.start_time, input.start_time);
            assert_eq!(event.end_time, input.end_time);
            assert_eq!(event.description, input.description);
            assert_eq!(event.status, EventStatus::Pending);
            assert_eq!(event.created_by, ana.user_id);
        }
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_patch_before_loading() {
        let carla = identity("Carla", Role::Coordenador);

        let mut repo = MockEventRepository::new();
        repo.expect_get_by_id().never();
        repo.expect_update().never();

        let svc = EventService::new(repo);
        let patch = UpdateEvent {
            start_date: Some(date(20)),
            end_date: Some(date(1)),
            ..Default::default()
        };

        assert!(matches!(
            svc.update(&carla, Uuid::now_v7(), patch).await,
            Err(EventError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_approval_workflow() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);
        let bruno = identity("Bruno", Role::Supervisor);
        let carla = identity("Carla", Role::Coordenador);

        let id = svc.create(&ana, workshop()).await.unwrap().event.id;

        // Not yet visible to other coordenadores
        assert!(svc.list_approved(DateRange::default()).await.unwrap().is_empty());
        assert!(matches!(svc.get(&carla, id).await, Err(EventError::Unauthorized(_))));

        let pending = svc.list_pending(&bruno).await.unwrap();
        assert_eq!(pending.len(), 1);

        let approved = svc.approve(&bruno, id).await.unwrap();
        assert_eq!(approved.event.status, EventStatus::Approved);
        assert_eq!(approved.event.approved_by, Some(bruno.user_id));
        assert!(approved.event.approved_at.is_some());

        assert_eq!(svc.list_approved(DateRange::default()).await.unwrap().len(), 1);
        assert!(svc.get(&carla, id).await.is_ok());
        assert!(svc.list_pending(&bruno).await.unwrap().is_empty());

        // Owner lost edit rights, supervisor keeps them
        assert!(matches!(svc.delete(&ana, id).await, Err(EventError::Unauthorized(_))));
        svc.delete(&bruno, id).await.unwrap();
        assert_eq!(svc.get(&bruno, id).await, Err(EventError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_decisions_are_final() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);
        let bruno = identity("Bruno", Role::Supervisor);

        let id = svc.create(&ana, workshop()).await.unwrap().event.id;
        svc.reject(&bruno, id).await.unwrap();

        assert_eq!(
            svc.approve(&bruno, id).await,
            Err(EventError::InvalidTransition {
                id,
                status: EventStatus::Rejected
            })
        );
        assert!(matches!(svc.approve(&ana, id).await, Err(EventError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_merges_and_revalidates() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);
        let id = svc.create(&ana, workshop()).await.unwrap().event.id;

        let inverted = UpdateEvent {
            start_date: Some(date(12)),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(&ana, id, inverted).await,
            Err(EventError::Validation(_))
        ));

        let all_day = UpdateEvent {
            title: Some(" Workshop de leitura ".to_string()),
            all_day: Some(true),
            ..Default::default()
        };
        let updated = svc.update(&ana, id, all_day).await.unwrap();
        assert_eq!(updated.event.title, "Workshop de leitura");
        assert!(updated.event.all_day);
        assert_eq!(updated.event.start_time, None);
        assert_eq!(updated.event.end_time, None);

        let blank = UpdateEvent {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(svc.update(&ana, id, blank).await, Err(EventError::Validation(_))));
    }

    #[tokio::test]
    async fn test_listing_scopes() {
        let svc = service();
        let ana = identity("Ana", Role::Coordenador);
        let carla = identity("Carla", Role::Coordenador);
        let bruno = identity("Bruno", Role::Supervisor);

        svc.create(&ana, workshop()).await.unwrap();
        svc.create(&carla, workshop()).await.unwrap();

        assert_eq!(svc.list_mine(&ana, DateRange::default()).await.unwrap().len(), 1);
        assert_eq!(svc.list_all(&bruno, DateRange::default()).await.unwrap().len(), 2);
        assert!(matches!(
            svc.list_all(&ana, DateRange::default()).await,
            Err(EventError::Unauthorized(_))
        ));
        assert!(svc.list_pending(&ana).await.is_err());

        let outside = DateRange {
            from: Some(date(11)),
            to: Some(date(20)),
        };
        assert!(svc.list_all(&bruno, outside).await.unwrap().is_empty());

        let inverted = DateRange {
            from: Some(date(20)),
            to: Some(date(1)),
        };
        assert!(matches!(
            svc.list_mine(&ana, inverted).await,
            Err(EventError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_denied_operations_never_write() {
        let ana = identity("Ana", Role::Coordenador);
        let carla = identity("Carla", Role::Coordenador);
        let stored = EventView::new(
            Event::new(workshop(), ana.user_id),
            Creator {
                name: ana.name.clone(),
                email: ana.email.clone(),
            },
        );
        let id = stored.event.id;

        let mut repo = MockEventRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update().never();
        repo.expect_delete().never();
        repo.expect_record_decision().never();

        let svc = EventService::new(repo);
        let patch = UpdateEvent {
            title: Some("Outro".to_string()),
            ..Default::default()
        };

        assert!(svc.update(&carla, id, patch).await.is_err());
        assert!(svc.delete(&carla, id).await.is_err());
        assert!(svc.approve(&ana, id).await.is_err());
        assert!(svc.reject(&carla, id).await.is_err());
    }

    #[tokio::test]
    async fn test_lost_race_reports_transition() {
        let ana = identity("Ana", Role::Coordenador);
        let bruno = identity("Bruno", Role::Supervisor);
        let pending = EventView::new(
            Event::new(workshop(), ana.user_id),
            Creator {
                name: ana.name.clone(),
                email: ana.email.clone(),
            },
        );
        let id = pending.event.id;
        let mut approved = pending.clone();
        approved.event.status = EventStatus::Approved;

        let mut repo = MockEventRepository::new();
        let mut reads = vec![approved, pending];
        repo.expect_get_by_id()
            .times(2)
            .returning(move |_| Ok(reads.pop()));
        repo.expect_record_decision().times(1).returning(|_, _| Ok(None));

        let svc = EventService::new(repo);
        assert_eq!(
            svc.reject(&bruno, id).await,
            Err(EventError::InvalidTransition {
                id,
                status: EventStatus::Approved
            })
        );
    }

    #[tokio::test]
    async fn test_owner_update_after_concurrent_approval_is_refused() {
        let ana = identity("Ana", Role::Coordenador);
        let pending = EventView::new(
            Event::new(workshop(), ana.user_id),
            Creator {
                name: ana.name.clone(),
                email: ana.email.clone(),
            },
        );
        let id = pending.event.id;
        let mut approved = pending.clone();
        approved.event.status = EventStatus::Approved;

        let mut repo = MockEventRepository::new();
        let mut reads = vec![approved, pending];
        repo.expect_get_by_id()
            .times(2)
            .returning(move |_| Ok(reads.pop()));
        repo.expect_update().times(1).returning(|_, _, _| Ok(None));

        let svc = EventService::new(repo);
        let patch = UpdateEvent {
            title: Some("Outro".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(&ana, id, patch).await,
            Err(EventError::Unauthorized(_))
        ));
    }
}
