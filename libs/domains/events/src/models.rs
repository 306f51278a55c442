//! Event domain models

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Event categories; the wire strings are fixed
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EventType {
    #[serde(rename = "Evento")]
    #[strum(serialize = "Evento")]
    #[sea_orm(string_value = "Evento")]
    Evento,
    #[serde(rename = "Ação Pontual")]
    #[strum(serialize = "Ação Pontual")]
    #[sea_orm(string_value = "Ação Pontual")]
    AcaoPontual,
    #[serde(rename = "Projeto Institucional")]
    #[strum(serialize = "Projeto Institucional")]
    #[sea_orm(string_value = "Projeto Institucional")]
    ProjetoInstitucional,
    #[serde(rename = "Projeto Pedagógico")]
    #[strum(serialize = "Projeto Pedagógico")]
    #[sea_orm(string_value = "Projeto Pedagógico")]
    ProjetoPedagogico,
    #[serde(rename = "Expedição Pedagógica")]
    #[strum(serialize = "Expedição Pedagógica")]
    #[sea_orm(string_value = "Expedição Pedagógica")]
    ExpedicaoPedagogica,
    #[serde(rename = "Formação")]
    #[strum(serialize = "Formação")]
    #[sea_orm(string_value = "Formação")]
    Formacao,
    #[serde(rename = "Festa")]
    #[strum(serialize = "Festa")]
    #[sea_orm(string_value = "Festa")]
    Festa,
}

/// Lifecycle state; `Pending` is the only initial state
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Main Event entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub end_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "11:30:00")]
    pub end_time: Option<NaiveTime>,
    pub all_day: bool,
    pub event_type: EventType,
    pub status: EventStatus,
    /// Owner; set once at creation
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Correlation id for an external calendar; never written here
    pub external_calendar_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// New pending event owned by `owner`
    pub fn new(input: CreateEvent, owner: Uuid) -> Self {
        let now = Utc::now();
        let (start_time, end_time) = if input.all_day {
            (None, None)
        } else {
            (input.start_time, input.end_time)
        };

        Self {
            id: Uuid::now_v7(),
            title: input.title.trim().to_string(),
            description: normalize_description(input.description),
            start_date: input.start_date,
            end_date: input.end_date,
            start_time,
            end_time,
            all_day: input.all_day,
            event_type: input.event_type,
            status: EventStatus::Pending,
            created_by: owner,
            approved_by: None,
            approved_at: None,
            external_calendar_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shape rules every stored event satisfies
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if self.title.chars().count() > TITLE_MAX_CHARS {
            return Err(format!("Title cannot exceed {} characters", TITLE_MAX_CHARS));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_CHARS {
                return Err(format!(
                    "Description cannot exceed {} characters",
                    DESCRIPTION_MAX_CHARS
                ));
            }
        }
        if self.end_date < self.start_date {
            return Err("end_date must be on or after start_date".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if self.start_date == self.end_date && end < start {
                return Err("end_time must be on or after start_time".to_string());
            }
        }
        Ok(())
    }
}

/// Display fields of the event's owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub email: String,
}

/// Event as returned by the API, with the creator denormalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub creator_name: String,
    pub creator_email: String,
}

impl EventView {
    pub fn new(event: Event, creator: Creator) -> Self {
        Self {
            event,
            creator_name: creator.name,
            creator_email: creator.email,
        }
    }
}

/// DTO for creating a new event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub event_type: EventType,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub all_day: bool,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "11:30:00")]
    pub end_time: Option<NaiveTime>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// DTO for a partial update
///
/// Absent fields are left alone; `null` clears the nullable ones and is a
/// 400 for the rest. Owner, status and timestamps are not accepted here.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200))]
    #[serde(default, deserialize_with = "non_null")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null")]
    pub event_type: Option<EventType>,
    #[serde(default, deserialize_with = "non_null")]
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "non_null")]
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "non_null")]
    pub all_day: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "11:30:00")]
    pub end_time: Option<Option<NaiveTime>>,
}

/// Present-but-null becomes `Some(None)`; absence stays `None` via `default`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Present values must be a `T`; `null` is an error
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Allow-list of mutable event fields handed to the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub event_type: Option<EventType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub all_day: Option<bool>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
}

impl EventPatch {
    /// Write the present fields onto `event`
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(start_date) = self.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            event.end_date = end_date;
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
    }

    /// Ordering rules decided by the patch alone, before the stored event
    /// is known. Times count only when the patch itself pins `all_day: false`.
    pub fn check_ordering(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err("end_date must be on or after start_date".to_string());
            }
            if let (Some(Some(start_time)), Some(Some(end_time))) = (self.start_time, self.end_time)
            {
                if start == end && self.all_day == Some(false) && end_time < start_time {
                    return Err("end_time must be on or after start_time".to_string());
                }
            }
        }
        Ok(())
    }

    /// Force both times to null
    pub fn clear_times(&mut self) {
        self.start_time = Some(None);
        self.end_time = Some(None);
    }
}

impl From<UpdateEvent> for EventPatch {
    fn from(input: UpdateEvent) -> Self {
        Self {
            title: input.title.map(|t| t.trim().to_string()),
            description: input.description.map(normalize_description),
            event_type: input.event_type,
            start_date: input.start_date,
            end_date: input.end_date,
            all_day: input.all_day,
            start_time: input.start_time,
            end_time: input.end_time,
        }
    }
}

/// Extra row predicate on store mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGuard {
    /// Administrative override; any status
    Any,
    /// Only while `status = 'pending'`
    Pending,
}

/// Outcome written by approve/reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub status: EventStatus,
    pub approver: Uuid,
    pub at: DateTime<Utc>,
}

/// Store-level query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub owner: Option<Uuid>,
    pub status: Option<EventStatus>,
    /// Events ending on or after this date
    pub from: Option<NaiveDate>,
    /// Events starting on or before this date
    pub to: Option<NaiveDate>,
}

impl EventFilter {
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.from = range.from;
        self.to = range.to;
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.owner.is_none_or(|owner| event.created_by == owner)
            && self.status.is_none_or(|status| event.status == status)
            && self.from.is_none_or(|from| event.end_date >= from)
            && self.to.is_none_or(|to| event.start_date <= to)
    }
}

/// Calendar window for list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRange {
    /// Only events ending on or after this date
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    /// Only events starting on or before this date
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

/// Body of approve/reject
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EventIdRequest {
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
}

/// `{ "events": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventsEnvelope {
    pub events: Vec<EventView>,
}

/// `{ "event": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventEnvelope {
    pub event: EventView,
}

/// `{ "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::from_str(s).unwrap()
    }

    fn create_input() -> CreateEvent {
        CreateEvent {
            title: "  Workshop  ".to_string(),
            event_type: EventType::Formacao,
            start_date: date("2025-03-01"),
            end_date: date("2025-03-01"),
            all_day: false,
            start_time: Some(time("09:00:00")),
            end_time: Some(time("11:00:00")),
            description: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_event_type_wire_strings() {
        assert_eq!(serde_json::to_string(&EventType::AcaoPontual).unwrap(), "\"Ação Pontual\"");
        assert_eq!(
            serde_json::from_str::<EventType>("\"Expedição Pedagógica\"").unwrap(),
            EventType::ExpedicaoPedagogica
        );
        assert_eq!(EventType::from_str("Formação").unwrap(), EventType::Formacao);
        assert_eq!(EventType::ProjetoPedagogico.to_string(), "Projeto Pedagógico");
        assert!(serde_json::from_str::<EventType>("\"Reunião\"").is_err());
        assert!(serde_json::from_str::<EventType>("\"formacao\"").is_err());
    }

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(serde_json::to_string(&EventStatus::Approved).unwrap(), "\"approved\"");
        assert_eq!(EventStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_new_event_is_pending_and_normalized() {
        let owner = Uuid::now_v7();
        let event = Event::new(create_input(), owner);

        assert_eq!(event.status, EventStatus::Pending);
        assert_eq!(event.created_by, owner);
        assert_eq!(event.title, "Workshop");
        assert_eq!(event.description, None);
        assert!(event.approved_by.is_none() && event.approved_at.is_none());
    }

    #[test]
    fn test_all_day_clears_times_on_create() {
        let mut input = create_input();
        input.all_day = true;

        let event = Event::new(input, Uuid::now_v7());
        assert_eq!(event.start_time, None);
        assert_eq!(event.end_time, None);
    }

    #[test]
    fn test_invariants() {
        let mut event = Event::new(create_input(), Uuid::now_v7());
        assert!(event.check_invariants().is_ok());

        event.end_date = date("2025-02-28");
        assert!(event.check_invariants().is_err());

        event.end_date = event.start_date;
        event.end_time = Some(time("08:00:00"));
        assert!(event.check_invariants().is_err());

        // Times compare only within a single day
        event.end_date = date("2025-03-02");
        assert!(event.check_invariants().is_ok());

        event.title = "x".repeat(201);
        assert!(event.check_invariants().is_err());
    }

    #[test]
    fn test_update_event_null_vs_absent() {
        let patch: UpdateEvent =
            serde_json::from_str(r#"{"start_time": null, "title": "Novo"}"#).unwrap();

        assert_eq!(patch.start_time, Some(None));
        assert_eq!(patch.end_time, None);
        assert_eq!(patch.title.as_deref(), Some("Novo"));
    }

    #[test]
    fn test_update_event_rejects_null_for_required_fields() {
        for body in [
            r#"{"title": null}"#,
            r#"{"event_type": null}"#,
            r#"{"start_date": null}"#,
            r#"{"end_date": null}"#,
            r#"{"all_day": null}"#,
        ] {
            assert!(serde_json::from_str::<UpdateEvent>(body).is_err(), "{}", body);
        }

        let patch: UpdateEvent = serde_json::from_str(r#"{"event_type": "Festa"}"#).unwrap();
        assert_eq!(patch.event_type, Some(EventType::Festa));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn test_patch_ordering_without_stored_event() {
        let patch = |json: &str| EventPatch::from(serde_json::from_str::<UpdateEvent>(json).unwrap());

        assert!(patch(r#"{"start_date": "2025-03-20", "end_date": "2025-03-01"}"#)
            .check_ordering()
            .is_err());
        assert!(patch(
            r#"{"start_date": "2025-03-01", "end_date": "2025-03-01", "all_day": false,
                "start_time": "11:00:00", "end_time": "09:00:00"}"#
        )
        .check_ordering()
        .is_err());
        // A single date needs the stored event to judge
        assert!(patch(r#"{"end_date": "2025-03-01"}"#).check_ordering().is_ok());
        assert!(patch(r#"{"start_date": "2025-03-01", "end_date": "2025-03-02"}"#)
            .check_ordering()
            .is_ok());
    }

    #[test]
    fn test_event_enum_column_values() {
        use sea_orm::ActiveEnum;

        assert_eq!(EventType::AcaoPontual.to_value(), "Ação Pontual");
        assert_eq!(
            EventType::try_from_value(&"Formação".to_string()).unwrap(),
            EventType::Formacao
        );
        assert_eq!(EventStatus::Approved.to_value(), "approved");
        assert!(EventStatus::try_from_value(&"done".to_string()).is_err());
    }

    #[test]
    fn test_update_event_rejects_immutable_fields() {
        assert!(serde_json::from_str::<UpdateEvent>(r#"{"status": "approved"}"#).is_err());
        assert!(serde_json::from_str::<UpdateEvent>(r#"{"created_by": "x"}"#).is_err());
    }

    #[test]
    fn test_patch_apply() {
        let mut event = Event::new(create_input(), Uuid::now_v7());
        let mut patch = EventPatch::from(UpdateEvent {
            title: Some(" Renomeado ".to_string()),
            all_day: Some(true),
            ..Default::default()
        });
        patch.clear_times();
        patch.apply_to(&mut event);

        assert_eq!(event.title, "Renomeado");
        assert!(event.all_day);
        assert_eq!(event.start_time, None);
        assert_eq!(event.event_type, EventType::Formacao);
    }

    #[test]
    fn test_filter_window_overlap() {
        let event = Event {
            end_date: date("2025-03-05"),
            ..Event::new(create_input(), Uuid::now_v7())
        };

        let filter = |from: &str, to: &str| EventFilter {
            from: Some(date(from)),
            to: Some(date(to)),
            ..Default::default()
        };

        assert!(filter("2025-03-03", "2025-03-10").matches(&event));
        assert!(filter("2025-02-01", "2025-03-01").matches(&event));
        assert!(!filter("2025-03-06", "2025-03-10").matches(&event));
        assert!(!filter("2025-02-01", "2025-02-28").matches(&event));
    }

    #[test]
    fn test_event_view_flattens() {
        let view = EventView::new(
            Event::new(create_input(), Uuid::now_v7()),
            Creator {
                name: "Ana".to_string(),
                email: "ana@escola.org".to_string(),
            },
        );

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Workshop");
        assert_eq!(json["event_type"], "Formação");
        assert_eq!(json["creator_name"], "Ana");
        assert_eq!(json["start_date"], "2025-03-01");
        assert_eq!(json["start_time"], "09:00:00");
    }

    #[test]
    fn test_event_id_request_uses_camel_case() {
        let id = Uuid::now_v7();
        let body: EventIdRequest =
            serde_json::from_str(&format!(r#"{{"eventId": "{}"}}"#, id)).unwrap();
        assert_eq!(body.event_id, id);
    }
}
