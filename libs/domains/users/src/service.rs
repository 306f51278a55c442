use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::JwtAuth;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::identity::Identity;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserResponse};
use crate::repository::UserRepository;

/// Service layer for accounts and roles
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
    /// Lowercased emails that register as supervisors
    supervisor_emails: Vec<String>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            jwt,
            supervisor_emails: Vec::new(),
        }
    }

    pub fn with_supervisor_emails(mut self, emails: Vec<String>) -> Self {
        self.supervisor_emails = emails.iter().map(|e| normalize_email(e)).collect();
        self
    }

    /// Token issuer shared with the auth middleware
    pub fn jwt(&self) -> &JwtAuth {
        &self.jwt
    }

    /// Create a local account and sign the caller in
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        validate_password(&input.password)?;

        let email = normalize_email(&input.email);
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(UserError::Validation("Name cannot be empty".to_string()));
        }

        let role = if self.supervisor_emails.contains(&email) {
            Role::Supervisor
        } else {
            Role::Coordenador
        };

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new_local(email, name, password_hash, role))
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        self.issue(user)
    }

    /// Check credentials and issue a token
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);

        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        let Some(hash) = user.password_hash.as_deref() else {
            // Provider accounts have no local password
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(&input.password, hash)? {
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Login attempt on inactive account");
            return Err(UserError::InvalidCredentials);
        }

        self.issue(user)
    }

    /// Current stored account for a verified identity
    pub async fn verify(&self, identity: &Identity) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(identity.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(UserError::Unauthenticated)?;

        Ok(user.into())
    }

    /// All accounts (supervisor only)
    pub async fn list_users(&self, actor: &Identity) -> UserResult<Vec<UserResponse>> {
        require_supervisor(actor, "list users")?;

        let users = self.repository.list().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Change a user's role (supervisor only)
    pub async fn set_role(
        &self,
        actor: &Identity,
        user_id: Uuid,
        role: Role,
    ) -> UserResult<UserResponse> {
        require_supervisor(actor, "change roles")?;

        let user = self
            .repository
            .update_role(user_id, role)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        tracing::info!(user_id = %user.id, role = %user.role, changed_by = %actor.user_id, "Role changed");
        Ok(user.into())
    }

    fn issue(&self, user: User) -> UserResult<AuthResponse> {
        let token = self
            .jwt
            .create_access_token(user.id, &user.email, &user.name, user.role.as_ref())
            .map_err(|e| UserError::Internal(format!("Token signing failed: {}", e)))?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

fn require_supervisor(actor: &Identity, action: &str) -> UserResult<()> {
    if actor.is_supervisor() {
        Ok(())
    } else {
        Err(UserError::Forbidden(format!("Only supervisors can {}", action)))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn validate_password(password: &str) -> UserResult<()> {
    let len = password.chars().count();

    if len < 8 {
        return Err(UserError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if len > 128 {
        return Err(UserError::Validation(
            "Password cannot exceed 128 characters".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(UserError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(UserError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}
