use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::identity::CurrentUser;
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, Role, UpdateRoleRequest, UserEnvelope,
    UserResponse, UsersEnvelope,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const AUTH_TAG: &str = "auth";
pub const USERS_TAG: &str = "users";

/// OpenAPI documentation for the auth endpoints
#[derive(OpenApi)]
#[openapi(
    paths(register, login, verify),
    components(
        schemas(RegisterRequest, LoginRequest, AuthResponse, UserEnvelope, UserResponse, Role),
        responses(
            BadRequestValidationResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = AUTH_TAG, description = "Registration, login and token verification"))
)]
pub struct AuthApiDoc;

/// OpenAPI documentation for the user management endpoints
#[derive(OpenApi)]
#[openapi(
    paths(list_users, update_role),
    components(
        schemas(UsersEnvelope, UserEnvelope, UpdateRoleRequest, UserResponse, Role),
        responses(ForbiddenResponse, NotFoundResponse, UnauthorizedResponse)
    ),
    tags((name = USERS_TAG, description = "User management (supervisor only)"))
)]
pub struct UsersApiDoc;

/// `/auth` routes; only `/verify` requires a token
pub fn auth_router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    let protected = Router::new()
        .route("/verify", post(verify))
        .route_layer(middleware::from_fn_with_state(
            service.jwt().clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
        .with_state(service)
}

/// `/users` routes, all behind the JWT middleware
pub fn users_router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}/role", put(update_role))
        .route_layer(middleware::from_fn_with_state(
            service.jwt().clone(),
            jwt_auth_middleware,
        ))
        .with_state(service)
}

/// Register a local account
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let email = input.email.clone();

    match service.register(input).await {
        Ok(auth) => {
            AuditEvent::new("user.register", AuditOutcome::Success)
                .user(auth.user.id)
                .resource("user", auth.user.id)
                .from_headers(&headers)
                .with_details(json!({ "role": auth.user.role }))
                .log();
            Ok((StatusCode::CREATED, Json(auth)))
        }
        Err(err) => {
            AuditEvent::new("user.register", AuditOutcome::Failure)
                .from_headers(&headers)
                .with_details(json!({ "email": email, "reason": err.to_string() }))
                .log();
            Err(err)
        }
    }
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<AuthResponse>> {
    let email = input.email.clone();

    match service.login(input).await {
        Ok(auth) => {
            AuditEvent::new("user.login", AuditOutcome::Success)
                .user(auth.user.id)
                .from_headers(&headers)
                .log();
            Ok(Json(auth))
        }
        Err(err) => {
            let outcome = match err {
                UserError::InvalidCredentials => AuditOutcome::Denied,
                _ => AuditOutcome::Failure,
            };
            AuditEvent::new("user.login", outcome)
                .from_headers(&headers)
                .with_details(json!({ "email": email }))
                .log();
            Err(err)
        }
    }
}

/// Return the stored account behind the presented token
#[utoipa::path(
    post,
    path = "/verify",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Token is valid", body = UserEnvelope),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn verify<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(identity): CurrentUser,
) -> UserResult<Json<UserEnvelope>> {
    let user = service.verify(&identity).await?;
    Ok(Json(UserEnvelope { user }))
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "All users", body = UsersEnvelope),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(identity): CurrentUser,
) -> UserResult<Json<UsersEnvelope>> {
    let users = service.list_users(&identity).await?;
    Ok(Json(UsersEnvelope { users }))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/{id}/role",
    tag = USERS_TAG,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_role<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateRoleRequest>,
) -> UserResult<Json<UserEnvelope>> {
    let result = service.set_role(&identity, id, input.role).await;

    let outcome = match &result {
        Ok(_) => AuditOutcome::Success,
        Err(UserError::Forbidden(_)) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new("user.role_change", outcome)
        .user(identity.user_id)
        .resource("user", id)
        .from_headers(&headers)
        .with_details(json!({ "role": input.role }))
        .log();

    Ok(Json(UserEnvelope { user: result? }))
}
