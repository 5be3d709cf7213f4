#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::{
        admin::{AdminScopeQuery, UserListQuery},
        regularizations::RequestListQuery,
    },
    models::{
        regularization_request::{
            ApprovalLevel, ApprovalRecord, ApprovalStatus, ApprovePayload, AttachmentMeta,
            AttachmentUpload, CreateRegularizationRequest, Priority, RegularizationResponse,
            RegularizationType, RejectPayload, RequestStatus,
        },
        user::{CreateUser, LoginRequest, LoginResponse, UserResponse},
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        me_doc,
        create_regularization_doc,
        my_regularizations_doc,
        regularization_detail_doc,
        cancel_regularization_doc,
        approval_queue_doc,
        approve_doc,
        reject_doc,
        admin_list_users_doc,
        admin_create_user_doc,
        admin_list_regularizations_doc,
        admin_export_doc
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            LoginResponse,
            CreateUser,
            UserResponse,
            // regularizations
            CreateRegularizationRequest,
            RegularizationResponse,
            RegularizationType,
            RequestStatus,
            Priority,
            ApprovalLevel,
            ApprovalStatus,
            ApprovalRecord,
            AttachmentUpload,
            AttachmentMeta,
            ApprovePayload,
            RejectPayload
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Authentication"),
        (name = "Regularizations", description = "Attendance regularization requests"),
        (name = "Approvals", description = "Approval queue and decisions"),
        (name = "Admin", description = "Administrative API")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Current user", body = UserResponse)),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/regularizations",
    request_body = CreateRegularizationRequest,
    responses(
        (status = 200, description = "Request submitted", body = RegularizationResponse),
        (status = 400, description = "Invalid payload")
    ),
    tag = "Regularizations"
)]
fn create_regularization_doc() {}

#[utoipa::path(
    get,
    path = "/api/regularizations/me",
    params(RequestListQuery),
    responses((status = 200, description = "Caller's own requests")),
    tag = "Regularizations"
)]
fn my_regularizations_doc() {}

#[utoipa::path(
    get,
    path = "/api/regularizations/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request detail", body = RegularizationResponse),
        (status = 404, description = "Not found")
    ),
    tag = "Regularizations"
)]
fn regularization_detail_doc() {}

#[utoipa::path(
    delete,
    path = "/api/regularizations/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request cancelled", body = RegularizationResponse),
        (status = 409, description = "Not cancellable in its current state")
    ),
    tag = "Regularizations"
)]
fn cancel_regularization_doc() {}

#[utoipa::path(
    get,
    path = "/api/approvals",
    params(RequestListQuery),
    responses((status = 200, description = "Approval queue for the caller's level")),
    tag = "Approvals"
)]
fn approval_queue_doc() {}

#[utoipa::path(
    put,
    path = "/api/approvals/{id}/approve",
    params(("id" = String, Path, description = "Request id")),
    request_body = ApprovePayload,
    responses(
        (status = 200, description = "Approved at the current level", body = RegularizationResponse),
        (status = 403, description = "Caller cannot act at this level"),
        (status = 409, description = "Request is not actionable")
    ),
    tag = "Approvals"
)]
fn approve_doc() {}

#[utoipa::path(
    put,
    path = "/api/approvals/{id}/reject",
    params(("id" = String, Path, description = "Request id")),
    request_body = RejectPayload,
    responses(
        (status = 200, description = "Rejected", body = RegularizationResponse),
        (status = 400, description = "Missing rejection reason"),
        (status = 403, description = "Caller cannot act at this level"),
        (status = 409, description = "Request is not actionable")
    ),
    tag = "Approvals"
)]
fn reject_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserListQuery),
    responses((status = 200, description = "User list")),
    tag = "Admin"
)]
fn admin_list_users_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUser,
    responses((status = 200, description = "User created", body = UserResponse)),
    tag = "Admin"
)]
fn admin_create_user_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/regularizations",
    params(AdminScopeQuery, RequestListQuery),
    responses((status = 200, description = "All requests, unscoped")),
    tag = "Admin"
)]
fn admin_list_regularizations_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/regularizations/export",
    params(AdminScopeQuery, RequestListQuery),
    responses((status = 200, description = "CSV export", content_type = "text/csv")),
    tag = "Admin"
)]
fn admin_export_doc() {}
