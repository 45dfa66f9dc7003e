//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{admin_handler, report_handler, superuser_handler, user_handler};
use crate::domain::reporting::{
    CategoryRevenue, CustomerActivity, DailySales, OverviewReport, ProductReport, ProductSales,
    SalesReport, UserReport,
};
use crate::domain::{
    CustomerRef, DashboardStats, OrderSummary, ReportKind, Role, SuperUserProfile,
    SuperUserStatus, UserResponse,
};
use crate::services::{SessionResponse, TokenResponse};
use crate::types::MessageResponse;

/// OpenAPI documentation for the Storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Accounts, superuser bootstrap, admin user management and sales reporting",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Accounts
        user_handler::register,
        user_handler::signin,
        user_handler::get_user,
        user_handler::update_user,
        // Superuser
        superuser_handler::check_superuser,
        superuser_handler::create_superuser,
        superuser_handler::signin_superuser,
        superuser_handler::get_profile,
        superuser_handler::update_profile,
        // Admin
        admin_handler::list_users,
        admin_handler::create_user,
        admin_handler::update_user,
        admin_handler::delete_user,
        admin_handler::toggle_admin,
        admin_handler::dashboard_stats,
        report_handler::get_report,
    ),
    components(
        schemas(
            // Identity
            Role,
            UserResponse,
            TokenResponse,
            SessionResponse,
            SuperUserStatus,
            SuperUserProfile,
            MessageResponse,
            // Requests
            user_handler::RegisterRequest,
            user_handler::SigninRequest,
            user_handler::UpdateUserRequest,
            user_handler::UpdateUserResponse,
            superuser_handler::CreateSuperUserRequest,
            superuser_handler::UpdateSuperUserRequest,
            admin_handler::AdminCreateUserRequest,
            admin_handler::AdminUpdateUserRequest,
            // Dashboard and reports
            CustomerRef,
            OrderSummary,
            DashboardStats,
            ReportKind,
            report_handler::ReportFormat,
            CategoryRevenue,
            OverviewReport,
            DailySales,
            SalesReport,
            ProductSales,
            ProductReport,
            CustomerActivity,
            UserReport,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration, signin and own record"),
        (name = "Superuser", description = "First-run bootstrap and superuser profile"),
        (name = "Admin", description = "User management, dashboard and reports")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
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
                        .description(Some("Token from /users/signin or /superuser/signin"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/users/register",
            "/users/{id}",
            "/superuser/create",
            "/superuser/profile",
            "/admin/users/{id}/toggle-admin",
            "/admin/reports/{kind}",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
        }
    }
}
