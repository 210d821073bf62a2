use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    AccessTokenResponse, ChangePasswordRequest, ConfirmEmailRequest, ForgotPasswordRequest,
    MessageResponse, ResetPasswordRequest, SignInRequest, SignUpRequest, WhoAmIResponse,
};
use crate::modules::maintenance::model::{MaintenanceStatusResponse, SetMaintenanceRequest};
use crate::modules::users::model::{
    PaginatedUsersResponse, SetLockoutRequest, UpdateRolesRequest, User, UserFilterParams,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::sign_up,
        crate::modules::auth::controller::sign_in,
        crate::modules::auth::controller::token,
        crate::modules::auth::controller::sign_in_refresh,
        crate::modules::auth::controller::token_refresh,
        crate::modules::auth::controller::sign_out,
        crate::modules::auth::controller::who_am_i,
        crate::modules::auth::controller::change_password,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::confirm_email,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::set_lockout,
        crate::modules::users::controller::update_roles,
        crate::modules::users::controller::resend_confirmation,
        crate::modules::maintenance::controller::get_maintenance,
        crate::modules::maintenance::controller::set_maintenance,
    ),
    components(
        schemas(
            User,
            SignInRequest,
            SignUpRequest,
            AccessTokenResponse,
            WhoAmIResponse,
            ChangePasswordRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ConfirmEmailRequest,
            MessageResponse,
            ErrorResponse,
            UserFilterParams,
            SetLockoutRequest,
            UpdateRolesRequest,
            PaginatedUsersResponse,
            PaginationMeta,
            PaginationParams,
            MaintenanceStatusResponse,
            SetMaintenanceRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-in, token and refresh endpoints"),
        (name = "Users", description = "Admin user management endpoints"),
        (name = "Admin", description = "System administration endpoints")
    ),
    info(
        title = "Signet API",
        version = "0.1.0",
        description = "A token issuance and refresh-token lifecycle service built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
