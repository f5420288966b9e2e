use axum_helpers::ErrorResponse;
use domain_users::{CreateUser, ListUsersResponse, UpdateUser, UserResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "User management service: CRUD plus soft delete, with case-insensitive email uniqueness"
    ),
    components(schemas(
        CreateUser,
        UpdateUser,
        UserResponse,
        ListUsersResponse,
        ErrorResponse
    )),
    tags((name = "users", description = "User management endpoints"))
)]
pub struct ApiDoc;
