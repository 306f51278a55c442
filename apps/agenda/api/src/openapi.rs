use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by protected handlers
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Agenda API",
        version = "0.1.0",
        description = "School calendar: coordenadores submit events, supervisors approve or reject them"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/auth", api = domain_users::handlers::AuthApiDoc),
        (path = "/users", api = domain_users::handlers::UsersApiDoc),
        (path = "/events", api = domain_events::ApiDoc)
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
