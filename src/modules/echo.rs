use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde_json::{Value, json};
use tracing::Span;

use crate::infrastructure::realtime::Namespace;
use crate::presentation::http::response::{ApiError, Responder};
use crate::presentation::http::routing::{TrackedRouter, post};
use crate::presentation::modules::{ModuleContext, ModuleDescriptor};

pub const NAME: &str = "echo";

const MAX_CHANNEL_LEN: usize = 64;

#[derive(Clone)]
struct EchoState {
    responder: Responder,
    span: Span,
    namespace: Option<Namespace>,
}

/// Replies with the posted body and, when realtime is enabled, re-emits it on
/// the `/echo` namespace under the channel name.
pub fn module(ctx: ModuleContext) -> ModuleDescriptor {
    let state = EchoState {
        responder: ctx.responder(),
        span: ctx.span().clone(),
        namespace: ctx.create_namespace("/echo"),
    };
    let router = TrackedRouter::new()
        .route("/:channel", post(echo))
        .with_state(state);
    ModuleDescriptor {
        name: NAME.into(),
        path: "echo".into(),
        router,
    }
}

async fn echo(
    State(state): State<EchoState>,
    Path(channel): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    if channel.len() > MAX_CHANNEL_LEN {
        return state.responder.send::<()>(Err(ApiError::BadRequest(format!(
            "channel name longer than {MAX_CHANNEL_LEN} characters"
        ))));
    }
    let delivered = state
        .namespace
        .as_ref()
        .map(|ns| ns.emit(channel.clone(), payload.clone()))
        .unwrap_or(0);
    tracing::debug!(parent: &state.span, %channel, delivered, "echo_emitted");
    state.responder.send(Ok(json!({
        "channel": channel,
        "delivered": delivered,
        "payload": payload,
    })))
}
