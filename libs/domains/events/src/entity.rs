use crate::models::{Event, EventStatus, EventType};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the events table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub all_day: bool,
    pub event_type: EventType,
    pub status: EventStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub external_calendar_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            start_date: model.start_date,
            end_date: model.end_date,
            start_time: model.start_time,
            end_time: model.end_time,
            all_day: model.all_day,
            event_type: model.event_type,
            status: model.status,
            created_by: model.created_by,
            approved_by: model.approved_by,
            approved_at: model.approved_at.map(Into::into),
            external_calendar_id: model.external_calendar_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Event> for ActiveModel {
    fn from(event: Event) -> Self {
        ActiveModel {
            id: Set(event.id),
            title: Set(event.title),
            description: Set(event.description),
            start_date: Set(event.start_date),
            end_date: Set(event.end_date),
            start_time: Set(event.start_time),
            end_time: Set(event.end_time),
            all_day: Set(event.all_day),
            event_type: Set(event.event_type),
            status: Set(event.status),
            created_by: Set(event.created_by),
            approved_by: Set(event.approved_by),
            approved_at: Set(event.approved_at.map(Into::into)),
            external_calendar_id: Set(event.external_calendar_id),
            created_at: Set(event.created_at.into()),
            updated_at: Set(event.updated_at.into()),
        }
    }
}
