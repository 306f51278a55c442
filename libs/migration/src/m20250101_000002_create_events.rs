use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CHECKS: &str = r#"
    ALTER TABLE events
        ADD CONSTRAINT chk_events_dates CHECK (end_date >= start_date),
        ADD CONSTRAINT chk_events_status CHECK (status IN ('pending', 'approved', 'rejected')),
        ADD CONSTRAINT chk_events_type CHECK (event_type IN (
            'Evento', 'Ação Pontual', 'Projeto Institucional', 'Projeto Pedagógico',
            'Expedição Pedagógica', 'Formação', 'Festa'
        )),
        ADD CONSTRAINT chk_events_decision CHECK (
            (status = 'pending' AND approved_by IS NULL AND approved_at IS NULL)
            OR (status <> 'pending' AND approved_at IS NOT NULL)
        )
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_uuid(Events::Id))
                    .col(string_len(Events::Title, 200))
                    .col(text_null(Events::Description))
                    .col(date(Events::StartDate))
                    .col(date(Events::EndDate))
                    .col(time_null(Events::StartTime))
                    .col(time_null(Events::EndTime))
                    .col(boolean(Events::AllDay).default(false))
                    .col(string(Events::EventType))
                    .col(string(Events::Status).default("pending"))
                    .col(uuid(Events::CreatedBy))
                    .col(uuid_null(Events::ApprovedBy))
                    .col(timestamp_with_time_zone_null(Events::ApprovedAt))
                    .col(string_null(Events::ExternalCalendarId))
                    .col(
                        timestamp_with_time_zone(Events::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Events::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_created_by")
                            .from(Events::Table, Events::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_approved_by")
                            .from(Events::Table, Events::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Decision columns are null exactly while pending. approved_by may be
        // nulled later by ON DELETE SET NULL, so only approved_at is tied in
        // the reverse direction.
        manager
            .get_connection()
            .execute_unprepared(CHECKS)
            .await?;

        for (name, col) in [
            ("idx_events_created_by", Events::CreatedBy),
            ("idx_events_status", Events::Status),
            ("idx_events_start_date", Events::StartDate),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Events::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER events_touch_updated_at
                    BEFORE UPDATE ON events
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS events_touch_updated_at ON events")
            .await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Description,
    StartDate,
    EndDate,
    StartTime,
    EndTime,
    AllDay,
    EventType,
    Status,
    CreatedBy,
    ApprovedBy,
    ApprovedAt,
    ExternalCalendarId,
    CreatedAt,
    UpdatedAt,
}
