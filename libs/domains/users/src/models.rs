use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User roles
///
/// `admin` is accepted on input and maps to [`Role::Supervisor`].
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
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    /// Base role; manages only their own pending events
    #[default]
    #[sea_orm(string_value = "coordenador")]
    Coordenador,
    /// Approves, rejects and overrides edits on any event
    #[serde(alias = "admin")]
    #[strum(to_string = "supervisor", serialize = "admin")]
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
}

/// Auth provider tag for accounts created through register
pub const LOCAL_PROVIDER: &str = "local";

/// User entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Lowercased email (unique)
    pub email: String,
    /// Display name
    pub name: String,
    /// Argon2 PHC string; `None` for provider accounts
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub auth_provider: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New active account with a local password
    pub fn new_local(email: String, name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email,
            name,
            password_hash: Some(password_hash),
            role,
            auth_provider: LOCAL_PROVIDER.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub auth_provider: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            auth_provider: user.auth_provider,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for account registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// 8-128 chars with upper, lower and digit
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// DTO for changing a user's role
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Token plus the account it was issued for
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// `{ "user": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// `{ "users": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersEnvelope {
    pub users: Vec<UserResponse>,
}
