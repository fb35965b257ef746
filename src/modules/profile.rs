use axum::{Extension, extract::State, response::Response};

use crate::presentation::http::auth::{CurrentUser, UserResponse};
use crate::presentation::http::response::Responder;
use crate::presentation::http::routing::{TrackedRouter, get};
use crate::presentation::modules::{ModuleContext, ModuleDescriptor};

pub const NAME: &str = "profile";

pub fn module(ctx: ModuleContext) -> ModuleDescriptor {
    let router = TrackedRouter::new()
        .route("/me", get(me))
        .require_auth(ctx.auth())
        .with_state(ctx.responder());
    ModuleDescriptor {
        name: NAME.into(),
        path: "profile".into(),
        router,
    }
}

async fn me(State(responder): State<Responder>, Extension(user): CurrentUser) -> Response {
    responder.send(Ok(UserResponse::from(user)))
}
