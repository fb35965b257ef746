use tracing::Span;

use crate::infrastructure::realtime::{Namespace, NamespaceRegistry};
use crate::presentation::http::auth::AuthGuard;
use crate::presentation::http::response::Responder;
use crate::presentation::http::routing::TrackedRouter;

/// Capabilities handed to a module factory.
#[derive(Clone)]
pub struct ModuleContext {
    auth: AuthGuard,
    span: Span,
    namespaces: Option<NamespaceRegistry>,
}

impl ModuleContext {
    pub fn new(auth: AuthGuard, namespaces: Option<NamespaceRegistry>) -> Self {
        Self {
            auth,
            span: tracing::info_span!("module", module = tracing::field::Empty),
            namespaces,
        }
    }

    pub fn auth(&self) -> &AuthGuard {
        &self.auth
    }

    pub fn responder(&self) -> Responder {
        Responder::new(self.span.clone())
    }

    /// The module's logger. Its `module` field is filled in once the module
    /// has been registered under its name.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// `None` when the process runs without a realtime server.
    pub fn create_namespace(&self, path: &str) -> Option<Namespace> {
        self.namespaces.as_ref().map(|n| n.create(path))
    }
}

/// What a module factory returns.
pub struct ModuleDescriptor {
    pub name: String,
    pub path: String,
    pub router: TrackedRouter,
}

pub type ModuleFactory = fn(ModuleContext) -> ModuleDescriptor;
