use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth::{Authenticator, NewAccount};
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::SessionUser;
use crate::presentation::http::response::ApiError;
use crate::presentation::http::routing::{TrackedRouter, get, post};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address or username.
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<SessionUser> for UserResponse {
    fn from(u: SessionUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Auth-validation capability: resolves bearer tokens to session users.
#[derive(Clone)]
pub struct AuthGuard {
    authenticator: Arc<Authenticator>,
}

impl AuthGuard {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }

    pub async fn check(&self, token: &str) -> Result<SessionUser, ApiError> {
        Ok(self.authenticator.authenticate(token).await?)
    }
}

/// Route layer installed by [`TrackedRouter::require_auth`]. On success the
/// [`SessionUser`] is available as a request extension.
pub async fn require_session(
    State(guard): State<AuthGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_from_headers(req.headers()).ok_or(ApiError::Unauthorized)?;
    let user = guard.check(&token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub fn routes(ctx: AppContext) -> TrackedRouter {
    TrackedRouter::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/auth/register", tag = "Auth", request_body = RegisterRequest, responses(
    (status = 200, body = UserResponse),
    (status = 403, description = "Registration is disabled")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let account = NewAccount {
        email: req.email,
        username: req.username,
        password: req.password,
    };
    let user = ctx.authenticator().register(&account).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(post, path = "/auth/login", tag = "Auth", request_body = LoginRequest, responses(
    (status = 200, body = LoginResponse),
    (status = 401, description = "Invalid credentials"),
    (status = 403, description = "Account is not active")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let session = ctx
        .authenticator()
        .login(&req.login, &req.password)
        .await?;

    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(
        &session.token,
        session.expires_in,
        secure_cookies(&ctx),
    );
    if let Ok(v) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, v);
    }

    Ok((
        headers,
        Json(LoginResponse {
            access_token: session.token,
            expires_in: session.expires_in,
            user: session.user.into(),
        }),
    ))
}

#[utoipa::path(post, path = "/auth/logout", tag = "Auth", responses(
    (status = 204),
    (status = 401, description = "Token does not verify")
))]
pub async fn logout(
    State(ctx): State<AppContext>,
    Bearer(token): Bearer,
) -> Result<(HeaderMap, StatusCode), ApiError> {
    ctx.authenticator().logout(&token).await?;

    let mut headers = HeaderMap::new();
    let cookie = if secure_cookies(&ctx) {
        "access_token=; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Lax"
    } else {
        "access_token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax"
    };
    headers.insert(header::SET_COOKIE, HeaderValue::from_static(cookie));
    Ok((headers, StatusCode::NO_CONTENT))
}

#[utoipa::path(get, path = "/auth/me", tag = "Auth", responses(
    (status = 200, body = UserResponse),
    (status = 401, description = "Missing or revoked token")
))]
pub async fn me(
    State(ctx): State<AppContext>,
    Bearer(token): Bearer,
) -> Result<Json<UserResponse>, ApiError> {
    let user = AuthGuard::new(ctx.authenticator()).check(&token).await?;
    Ok(Json(user.into()))
}

/// Handler-side access to the user resolved by [`require_session`].
pub type CurrentUser = Extension<SessionUser>;

// --- Bearer extractor & cookie helpers ---

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_from_headers(&parts.headers)
            .map(Bearer)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Prefers the `Authorization` header, falls back to the `access_token`
/// cookie.
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(t) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
    {
        return Some(t.trim().to_string());
    }
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookie_hdr| get_cookie(cookie_hdr, "access_token"))
}

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn secure_cookies(ctx: &AppContext) -> bool {
    ctx.cfg
        .frontend_url
        .as_deref()
        .map(|u| u.starts_with("https://"))
        .unwrap_or(false)
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "access_token={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
