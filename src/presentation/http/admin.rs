use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::auth::NewAccount;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::UserResponse;
use crate::presentation::http::response::ApiError;
use crate::presentation::http::routing::{TrackedRouter, get, post};

pub const ADMIN_KEY_ERROR: &str = "Please provide the \"adminKey\" as a query parameter";

/// What the running process has mounted. Fixed once the router is built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub modules: Vec<String>,
    pub endpoints: Vec<String>,
}

#[derive(Clone)]
pub struct AdminState {
    pub ctx: AppContext,
    pub catalog: Arc<Catalog>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminQuery {
    #[serde(rename = "adminKey")]
    pub admin_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InfoResponse {
    pub modules: Vec<String>,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

pub fn routes() -> TrackedRouter<AdminState> {
    TrackedRouter::new()
        .route("/info", get(info))
        .route("/admin/users", post(create_user))
}

/// A query string that does not parse (e.g. a repeated `adminKey`) counts as
/// a missing key.
fn authorize(state: &AdminState, query: Option<&AdminQuery>) -> Result<(), ApiError> {
    match query.and_then(|q| q.admin_key.as_deref()) {
        Some(key) if key == state.ctx.cfg.admin_key => Ok(()),
        _ => Err(ApiError::Forbidden(ADMIN_KEY_ERROR.into())),
    }
}

#[utoipa::path(get, path = "/info", tag = "Admin", params(AdminQuery), responses(
    (status = 200, body = InfoResponse),
    (status = 403, description = "Missing or wrong admin key")
))]
pub async fn info(
    State(state): State<AdminState>,
    query: Option<Query<AdminQuery>>,
) -> Result<Json<InfoResponse>, ApiError> {
    authorize(&state, query.as_deref())?;
    Ok(Json(InfoResponse {
        modules: state.catalog.modules.clone(),
        endpoints: state.catalog.endpoints.clone(),
    }))
}

#[utoipa::path(post, path = "/admin/users", tag = "Admin", params(AdminQuery),
    request_body = CreateUserRequest, responses(
    (status = 201, body = UserResponse),
    (status = 403, description = "Missing or wrong admin key"),
    (status = 409, description = "Email or username taken")
))]
pub async fn create_user(
    State(state): State<AdminState>,
    query: Option<Query<AdminQuery>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    authorize(&state, query.as_deref())?;
    let account = NewAccount {
        email: req.email,
        username: req.username,
        password: req.password,
    };
    let user = state
        .ctx
        .authenticator()
        .provision(&account, req.active)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}
