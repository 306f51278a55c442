use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{Role, User},
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> UserError {
    tracing::error!(error = %e, "User store failure");
    UserError::Internal(format!("Database error: {}", e))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let email = user.email.clone();
        let active_model: entity::ActiveModel = user.into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UserError::DuplicateEmail(email)
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        // Stored emails are lowercase (chk_users_email_lower)
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> UserResult<Option<User>> {
        let active_model = entity::ActiveModel {
            id: Set(id),
            role: Set(role),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        match active_model.update(&self.db).await {
            Ok(model) => Ok(Some(model.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }
}
