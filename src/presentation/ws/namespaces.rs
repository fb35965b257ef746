use axum::{
    Router,
    extract::ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures_util::{SinkExt, Stream, StreamExt};

use crate::infrastructure::realtime::{Namespace, NamespaceEvent, NamespaceRegistry};

pub fn routes(registry: NamespaceRegistry) -> Router {
    Router::new()
        .route("/ns/*path", get(namespace_ws_entry))
        .with_state(registry)
}

/// Joins an existing namespace. Namespaces are only created by modules, so
/// an unknown path is a 404 whether or not the request is an upgrade.
pub async fn namespace_ws_entry(
    State(registry): State<NamespaceRegistry>,
    Path(path): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(ns) = registry.get(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| peer(ns, socket)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Re-emits every inbound text frame that decodes as a [`NamespaceEvent`].
/// Returns when the peer closes or the stream errors.
pub(crate) async fn relay_inbound<S, E>(ns: &Namespace, mut stream: S)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
{
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<NamespaceEvent>(&text) {
                Ok(evt) => {
                    ns.publish(evt);
                }
                Err(e) => tracing::debug!(error = %e, "ns_inbound_ignored"),
            },
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}

async fn peer(ns: Namespace, socket: WebSocket) {
    let namespace = ns.path().to_string();
    tracing::debug!(%namespace, "ns_peer_connected");
    let (mut sink, mut stream) = socket.split();
    let mut events = ns.subscribe();

    let outbound = async {
        while let Some(evt) = events.next().await {
            let text = match serde_json::to_string(&evt) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(error = ?e, "ns_event_encode_failed");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    };

    let inbound = relay_inbound(&ns, &mut stream);

    tokio::select! {
        _ = outbound => {}
        _ = inbound => {}
    }
    tracing::debug!(%namespace, "ns_peer_disconnected");
}
