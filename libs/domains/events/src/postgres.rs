use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, QueryResult, Statement, Value,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{EventError, EventResult},
    models::{
        Creator, Decision, Event, EventFilter, EventPatch, EventStatus, EventView, StatusGuard,
    },
    repository::EventRepository,
};

const SELECT_VIEW: &str = r#"
    SELECT e.*, u.name AS creator_name, u.email AS creator_email
    FROM events e
    JOIN users u ON u.id = e.created_by
"#;

const ORDER_VIEW: &str = "ORDER BY e.start_date, e.start_time NULLS FIRST, e.created_at, e.id";

/// PostgreSQL implementation of EventRepository using SeaORM
///
/// Reads join the creator's name and email with a raw statement; writes go
/// through the entity so guarded updates stay single statements.
#[derive(Clone)]
pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn creator_of(&self, user_id: Uuid) -> EventResult<Creator> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT name, email FROM users WHERE id = $1",
            [user_id.into()],
        );

        let row = CreatorRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| EventError::Internal(format!("Creator {} not found", user_id)))?;

        Ok(Creator {
            name: row.name,
            email: row.email,
        })
    }

    async fn with_creator(&self, model: Option<entity::Model>) -> EventResult<Option<EventView>> {
        match model {
            Some(model) => {
                let creator = self.creator_of(model.created_by).await?;
                Ok(Some(EventView::new(model.into(), creator)))
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CreatorRow {
    name: String,
    email: String,
}

fn view_from_row(row: &QueryResult) -> Result<EventView, DbErr> {
    let model = entity::Model::from_query_result(row, "")?;
    let creator = Creator {
        name: row.try_get("", "creator_name")?,
        email: row.try_get("", "creator_email")?,
    };
    Ok(EventView::new(Event::from(model), creator))
}

fn db_error(e: DbErr) -> EventError {
    tracing::error!(error = %e, "Event store failure");
    EventError::Internal(format!("Database error: {}", e))
}

/// `WHERE` clause and its positional values for a list filter
fn filter_clause(filter: &EventFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(owner) = filter.owner {
        values.push(owner.into());
        conditions.push(format!("e.created_by = ${}", values.len()));
    }
    if let Some(status) = filter.status {
        values.push(status.to_string().into());
        conditions.push(format!("e.status = ${}", values.len()));
    }
    if let Some(from) = filter.from {
        values.push(from.into());
        conditions.push(format!("e.end_date >= ${}", values.len()));
    }
    if let Some(to) = filter.to {
        values.push(to.into());
        conditions.push(format!("e.start_date <= ${}", values.len()));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), values)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, event: Event, creator: Creator) -> EventResult<EventView> {
        let active_model: entity::ActiveModel = event.into();

        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(event_id = %model.id, "Created event");
        Ok(EventView::new(model.into(), creator))
    }

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<EventView>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("{} WHERE e.id = $1", SELECT_VIEW),
            [id.into()],
        );

        let row = self.db.query_one_raw(stmt).await.map_err(db_error)?;
        row.as_ref()
            .map(view_from_row)
            .transpose()
            .map_err(db_error)
    }

    async fn list(&self, filter: EventFilter) -> EventResult<Vec<EventView>> {
        let (clause, values) = filter_clause(&filter);
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("{} {} {}", SELECT_VIEW, clause, ORDER_VIEW),
            values,
        );

        let rows = self.db.query_all_raw(stmt).await.map_err(db_error)?;
        rows.iter()
            .map(view_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        guard: StatusGuard,
    ) -> EventResult<Option<EventView>> {
        use entity::Column;

        let mut query = entity::Entity::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id));

        if let Some(title) = patch.title {
            query = query.col_expr(Column::Title, Expr::value(title));
        }
        if let Some(description) = patch.description {
            query = query.col_expr(Column::Description, Expr::value(description));
        }
        if let Some(event_type) = patch.event_type {
            query = query.col_expr(Column::EventType, Expr::value(event_type.to_string()));
        }
        if let Some(start_date) = patch.start_date {
            query = query.col_expr(Column::StartDate, Expr::value(start_date));
        }
        if let Some(end_date) = patch.end_date {
            query = query.col_expr(Column::EndDate, Expr::value(end_date));
        }
        if let Some(all_day) = patch.all_day {
            query = query.col_expr(Column::AllDay, Expr::value(all_day));
        }
        if let Some(start_time) = patch.start_time {
            query = query.col_expr(Column::StartTime, Expr::value(start_time));
        }
        if let Some(end_time) = patch.end_time {
            query = query.col_expr(Column::EndTime, Expr::value(end_time));
        }

        if guard == StatusGuard::Pending {
            query = query.filter(Column::Status.eq(EventStatus::Pending.to_string()));
        }

        let updated = query.exec_with_returning(&self.db).await.map_err(db_error)?;
        self.with_creator(updated.into_iter().next()).await
    }

    async fn record_decision(
        &self,
        id: Uuid,
        decision: Decision,
    ) -> EventResult<Option<EventView>> {
        use entity::Column;

        // Single conditional statement: concurrent decisions on one event
        // leave exactly one winner
        let updated = entity::Entity::update_many()
            .col_expr(Column::Status, Expr::value(decision.status.to_string()))
            .col_expr(Column::ApprovedBy, Expr::value(decision.approver))
            .col_expr(Column::ApprovedAt, Expr::value(decision.at))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(EventStatus::Pending.to_string()))
            .exec_with_returning(&self.db)
            .await
            .map_err(db_error)?;

        self.with_creator(updated.into_iter().next()).await
    }

    async fn delete(&self, id: Uuid, guard: StatusGuard) -> EventResult<bool> {
        use entity::Column;

        let mut query = entity::Entity::delete_many().filter(Column::Id.eq(id));
        if guard == StatusGuard::Pending {
            query = query.filter(Column::Status.eq(EventStatus::Pending.to_string()));
        }

        let result = query.exec(&self.db).await.map_err(db_error)?;
        Ok(result.rows_affected > 0)
    }
}
