use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use futures_util::{StreamExt, stream::BoxStream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

const CHANNEL_CAPACITY: usize = 64;

/// A message exchanged on a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceEvent {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// One pub/sub channel, addressed by path.
#[derive(Clone)]
pub struct Namespace {
    path: Arc<str>,
    sender: broadcast::Sender<NamespaceEvent>,
}

impl Namespace {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fans the event out to current subscribers and returns how many
    /// received it. No subscribers is not an error.
    pub fn emit(&self, event: impl Into<String>, payload: serde_json::Value) -> usize {
        self.publish(NamespaceEvent {
            event: event.into(),
            payload,
        })
    }

    pub fn publish(&self, event: NamespaceEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Lagging subscribers skip the events they missed.
    pub fn subscribe(&self) -> BoxStream<'static, NamespaceEvent> {
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(|evt| async move { evt.ok() })
            .boxed()
    }
}

/// Namespaces created on demand by modules.
#[derive(Clone, Default)]
pub struct NamespaceRegistry {
    inner: Arc<RwLock<HashMap<String, Namespace>>>,
}

pub fn normalize_namespace(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the namespace at `path`, creating it if needed.
    pub fn create(&self, path: &str) -> Namespace {
        let key = normalize_namespace(path);
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(key.clone())
            .or_insert_with(|| {
                tracing::debug!(namespace = %key, "namespace_created");
                let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
                Namespace {
                    path: Arc::from(key.as_str()),
                    sender,
                }
            })
            .clone()
    }

    pub fn get(&self, path: &str) -> Option<Namespace> {
        let key = normalize_namespace(path);
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        out.sort();
        out
    }
}
