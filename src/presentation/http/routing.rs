//! Routers that remember how they were built.
//!
//! [`TrackedRouter`] mirrors the parts of [`axum::Router`] that modules use
//! and records every literal path and method into a [`RouteNode`] tree, which
//! feeds the `/info` endpoint listing.

use axum::{
    Router,
    handler::Handler,
    http::Method,
    routing::{self, MethodRouter},
};

use crate::application::introspection::RouteNode;
use crate::presentation::http::auth::{AuthGuard, require_session};

/// A method router together with the methods it serves.
pub struct Endpoints<S = ()> {
    inner: MethodRouter<S>,
    methods: Vec<Method>,
}

macro_rules! top_level_endpoint {
    ($name:ident, $method:ident) => {
        pub fn $name<H, T, S>(handler: H) -> Endpoints<S>
        where
            H: Handler<T, S>,
            T: 'static,
            S: Clone + Send + Sync + 'static,
        {
            Endpoints {
                inner: routing::$name(handler),
                methods: vec![Method::$method],
            }
        }
    };
}

macro_rules! chained_endpoint {
    ($name:ident, $method:ident) => {
        pub fn $name<H, T>(mut self, handler: H) -> Self
        where
            H: Handler<T, S>,
            T: 'static,
        {
            self.inner = self.inner.$name(handler);
            self.methods.push(Method::$method);
            self
        }
    };
}

top_level_endpoint!(get, GET);
top_level_endpoint!(post, POST);
top_level_endpoint!(put, PUT);
top_level_endpoint!(patch, PATCH);
top_level_endpoint!(delete, DELETE);

impl<S> Endpoints<S>
where
    S: Clone + Send + Sync + 'static,
{
    chained_endpoint!(get, GET);
    chained_endpoint!(post, POST);
    chained_endpoint!(put, PUT);
    chained_endpoint!(patch, PATCH);
    chained_endpoint!(delete, DELETE);
}

fn rooted(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn is_root(path: &str) -> bool {
    path.trim_matches('/').is_empty()
}

pub struct TrackedRouter<S = ()> {
    router: Router<S>,
    tree: RouteNode,
}

impl<S> Default for TrackedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TrackedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            tree: RouteNode::root(),
        }
    }

    pub fn route(mut self, path: &str, endpoints: Endpoints<S>) -> Self {
        let path = rooted(path);
        self.router = self.router.route(&path, endpoints.inner);
        self.tree.push(RouteNode::route(path, endpoints.methods));
        self
    }

    /// Nesting at the root is treated as a merge.
    pub fn nest(mut self, path: &str, other: TrackedRouter<S>) -> Self {
        if is_root(path) {
            return self.merge(other);
        }
        let path = rooted(path);
        self.router = self.router.nest(&path, other.router);
        self.tree.push(other.tree.mounted_at(&path));
        self
    }

    pub fn merge(mut self, other: TrackedRouter<S>) -> Self {
        self.router = self.router.merge(other.router);
        self.tree.absorb(other.tree);
        self
    }

    /// Puts every route added so far behind the session check. Routes added
    /// afterwards stay public, and at least one route must precede the call.
    pub fn require_auth(mut self, guard: &AuthGuard) -> Self {
        self.router = self.router.route_layer(axum::middleware::from_fn_with_state(
            guard.clone(),
            require_session,
        ));
        self
    }

    pub fn with_state<S2>(self, state: S) -> TrackedRouter<S2> {
        TrackedRouter {
            router: self.router.with_state(state),
            tree: self.tree,
        }
    }

    pub fn tree(&self) -> &RouteNode {
        &self.tree
    }

    pub fn into_parts(self) -> (Router<S>, RouteNode) {
        (self.router, self.tree)
    }
}
