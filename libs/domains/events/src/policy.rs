//! Who may do what to an event.
//!
//! Pure functions over the caller's [`Identity`] and the event's current
//! state; nothing here touches storage. Mutating checks return the
//! [`StatusGuard`] the store must apply so the decision still holds when the
//! row is written.
//!
//! | Action            | Owner               | Supervisor            | Others              |
//! |-------------------|---------------------|-----------------------|---------------------|
//! | read              | yes                 | yes                   | only when approved  |
//! | update / delete   | while pending       | any status            | no                  |
//! | approve / reject  | no                  | while pending         | no                  |
//! | list all, pending | no                  | yes                   | no                  |

use domain_users::Identity;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventStatus, StatusGuard};

fn is_owner(actor: &Identity, event: &Event) -> bool {
    event.created_by == actor.user_id
}

pub fn can_read(actor: &Identity, event: &Event) -> EventResult<()> {
    if actor.is_supervisor() || is_owner(actor, event) || event.status == EventStatus::Approved {
        Ok(())
    } else {
        Err(EventError::unauthorized("You cannot view this event"))
    }
}

pub fn can_list_all(actor: &Identity) -> EventResult<()> {
    require_supervisor(actor, "Only supervisors can list all events")
}

pub fn can_list_pending(actor: &Identity) -> EventResult<()> {
    require_supervisor(actor, "Only supervisors can list pending events")
}

/// Field edits: owner while pending, supervisor always
pub fn can_update(actor: &Identity, event: &Event) -> EventResult<StatusGuard> {
    owner_while_pending(actor, event, "edit")
}

/// Removal: owner while pending, supervisor always
pub fn can_delete(actor: &Identity, event: &Event) -> EventResult<StatusGuard> {
    owner_while_pending(actor, event, "delete")
}

/// Approve or reject. Role is checked before status.
pub fn can_decide(actor: &Identity, event: &Event) -> EventResult<()> {
    require_supervisor(actor, "Only supervisors can approve or reject events")?;

    if event.status != EventStatus::Pending {
        return Err(EventError::InvalidTransition {
            id: event.id,
            status: event.status,
        });
    }
    Ok(())
}

fn owner_while_pending(actor: &Identity, event: &Event, verb: &str) -> EventResult<StatusGuard> {
    if actor.is_supervisor() {
        return Ok(StatusGuard::Any);
    }
    if !is_owner(actor, event) {
        return Err(EventError::unauthorized(format!(
            "You can only {} your own events",
            verb
        )));
    }
    if event.status != EventStatus::Pending {
        return Err(EventError::unauthorized(format!(
            "You can only {} events that are still pending",
            verb
        )));
    }
    Ok(StatusGuard::Pending)
}

fn require_supervisor(actor: &Identity, message: &str) -> EventResult<()> {
    if actor.is_supervisor() {
        Ok(())
    } else {
        Err(EventError::unauthorized(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateEvent, EventType};
    use chrono::{NaiveDate, Utc};
    use domain_users::Role;
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::now_v7(),
            email: format!("{}@escola.org", role),
            name: role.to_string(),
            role,
        }
    }

    fn event_owned_by(owner: &Identity, status: EventStatus) -> Event {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut event = Event::new(
            CreateEvent {
                title: "Workshop".to_string(),
                event_type: EventType::Formacao,
                start_date: day,
                end_date: day,
                all_day: true,
                start_time: None,
                end_time: None,
                description: None,
            },
            owner.user_id,
        );
        event.status = status;
        if status != EventStatus::Pending {
            event.approved_by = Some(Uuid::now_v7());
            event.approved_at = Some(Utc::now());
        }
        event
    }

    #[test]
    fn test_read_rules() {
        let owner = identity(Role::Coordenador);
        let other = identity(Role::Coordenador);
        let supervisor = identity(Role::Supervisor);

        let pending = event_owned_by(&owner, EventStatus::Pending);
        assert!(can_read(&owner, &pending).is_ok());
        assert!(can_read(&supervisor, &pending).is_ok());
        assert!(matches!(can_read(&other, &pending), Err(EventError::Unauthorized(_))));

        let rejected = event_owned_by(&owner, EventStatus::Rejected);
        assert!(can_read(&other, &rejected).is_err());

        let approved = event_owned_by(&owner, EventStatus::Approved);
        assert!(can_read(&other, &approved).is_ok());
    }

    #[test]
    fn test_owner_edits_only_while_pending() {
        let owner = identity(Role::Coordenador);

        let pending = event_owned_by(&owner, EventStatus::Pending);
        assert_eq!(can_update(&owner, &pending), Ok(StatusGuard::Pending));
        assert_eq!(can_delete(&owner, &pending), Ok(StatusGuard::Pending));

        for status in [EventStatus::Approved, EventStatus::Rejected] {
            let decided = event_owned_by(&owner, status);
            assert!(matches!(can_update(&owner, &decided), Err(EventError::Unauthorized(_))));
            assert!(matches!(can_delete(&owner, &decided), Err(EventError::Unauthorized(_))));
        }
    }

    #[test]
    fn test_other_coordenador_is_refused() {
        let owner = identity(Role::Coordenador);
        let other = identity(Role::Coordenador);
        let pending = event_owned_by(&owner, EventStatus::Pending);

        assert!(matches!(can_update(&other, &pending), Err(EventError::Unauthorized(_))));
        assert!(matches!(can_delete(&other, &pending), Err(EventError::Unauthorized(_))));
    }

    #[test]
    fn test_supervisor_overrides_any_status() {
        let owner = identity(Role::Coordenador);
        let supervisor = identity(Role::Supervisor);

        for status in [EventStatus::Pending, EventStatus::Approved, EventStatus::Rejected] {
            let event = event_owned_by(&owner, status);
            assert_eq!(can_update(&supervisor, &event), Ok(StatusGuard::Any));
            assert_eq!(can_delete(&supervisor, &event), Ok(StatusGuard::Any));
        }
    }

    #[test]
    fn test_decide_checks_role_before_status() {
        let owner = identity(Role::Coordenador);
        let supervisor = identity(Role::Supervisor);

        let approved = event_owned_by(&owner, EventStatus::Approved);
        assert!(matches!(can_decide(&owner, &approved), Err(EventError::Unauthorized(_))));
        assert_eq!(
            can_decide(&supervisor, &approved),
            Err(EventError::InvalidTransition {
                id: approved.id,
                status: EventStatus::Approved
            })
        );

        let pending = event_owned_by(&owner, EventStatus::Pending);
        assert!(can_decide(&supervisor, &pending).is_ok());
        assert!(can_decide(&owner, &pending).is_err());
    }

    #[test]
    fn test_supervisor_only_lists() {
        assert!(can_list_all(&identity(Role::Supervisor)).is_ok());
        assert!(can_list_pending(&identity(Role::Supervisor)).is_ok());
        assert!(can_list_all(&identity(Role::Coordenador)).is_err());
        assert!(can_list_pending(&identity(Role::Coordenador)).is_err());
    }
}
