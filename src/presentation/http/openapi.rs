use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::auth::register,
        crate::presentation::http::auth::login,
        crate::presentation::http::auth::logout,
        crate::presentation::http::auth::me,
        crate::presentation::http::admin::info,
        crate::presentation::http::admin::create_user,
        crate::presentation::http::health::health,
    ),
    components(schemas(
        crate::presentation::http::auth::RegisterRequest,
        crate::presentation::http::auth::LoginRequest,
        crate::presentation::http::auth::LoginResponse,
        crate::presentation::http::auth::UserResponse,
        crate::presentation::http::admin::InfoResponse,
        crate::presentation::http::admin::CreateUserRequest,
        crate::presentation::http::health::HealthResp,
    )),
    tags(
        (name = "Auth", description = "Authentication"),
        (name = "Admin", description = "Operator endpoints guarded by the admin key"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;
