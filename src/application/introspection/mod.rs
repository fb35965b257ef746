//! Endpoint catalogue built from the literal paths recorded at mount time.
//!
//! Routers record what they were given (`route("/items/:id", ...)`,
//! `nest("/api/widgets", ...)`) rather than reverse-engineering axum's
//! compiled matchers, so every node is a plain string. Only services nested
//! as opaque tower services cannot be expanded; they show up as
//! `<complex:label>` markers.

use std::collections::BTreeSet;

use http::Method;

#[derive(Debug, Clone)]
pub enum RouteNode {
    /// A router mounted at `prefix` (empty for the root or a merge).
    Router {
        prefix: String,
        children: Vec<RouteNode>,
    },
    /// A path with one handler per method.
    Route {
        path: String,
        handlers: Vec<RouteNode>,
    },
    Handler { method: Method },
    /// A nested service whose routes are not known.
    Opaque { prefix: String, label: String },
}

impl RouteNode {
    pub fn root() -> Self {
        RouteNode::Router {
            prefix: String::new(),
            children: Vec::new(),
        }
    }

    pub fn route(path: impl Into<String>, methods: impl IntoIterator<Item = Method>) -> Self {
        RouteNode::Route {
            path: path.into(),
            handlers: methods
                .into_iter()
                .map(|method| RouteNode::Handler { method })
                .collect(),
        }
    }

    pub fn opaque(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        RouteNode::Opaque {
            prefix: prefix.into(),
            label: label.into(),
        }
    }

    /// Appends a child to a `Router` node. Other variants are left unchanged.
    pub fn push(&mut self, child: RouteNode) {
        if let RouteNode::Router { children, .. } = self {
            children.push(child);
        }
    }

    /// Re-roots this node under `prefix`. A router with an empty prefix takes
    /// the new prefix; anything else is wrapped.
    pub fn mounted_at(self, prefix: &str) -> Self {
        match self {
            RouteNode::Router {
                prefix: existing,
                children,
            } if existing.is_empty() => RouteNode::Router {
                prefix: prefix.to_string(),
                children,
            },
            other => RouteNode::Router {
                prefix: prefix.to_string(),
                children: vec![other],
            },
        }
    }

    /// Moves the children of a router node into `self` (used for merges).
    pub fn absorb(&mut self, other: RouteNode) {
        match other {
            RouteNode::Router { prefix, children } if prefix.is_empty() => {
                for child in children {
                    self.push(child);
                }
            }
            other => self.push(other),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn join(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

/// Flattens the tree into `METHOD /path` strings, deduplicated and sorted.
pub fn list_endpoints(root: &RouteNode) -> Vec<String> {
    let mut out = BTreeSet::new();
    let mut stack: Vec<(&RouteNode, Vec<&str>)> = vec![(root, Vec::new())];

    while let Some((node, prefix)) = stack.pop() {
        match node {
            RouteNode::Router {
                prefix: own,
                children,
            } => {
                let mut acc = prefix;
                acc.extend(segments(own));
                // Reverse so siblings are visited in declaration order.
                for child in children.iter().rev() {
                    stack.push((child, acc.clone()));
                }
            }
            RouteNode::Route { path, handlers } => {
                let mut acc = prefix;
                acc.extend(segments(path));
                for handler in handlers.iter().rev() {
                    stack.push((handler, acc.clone()));
                }
            }
            RouteNode::Handler { method } => {
                out.insert(format!("{} {}", method, join(&prefix)));
            }
            RouteNode::Opaque {
                prefix: own,
                label,
            } => {
                let mut acc = prefix;
                acc.extend(segments(own));
                let base = join(&acc);
                out.insert(format!(
                    "ANY {}/<complex:{label}>",
                    base.trim_end_matches('/')
                ));
            }
        }
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_routes_are_listed_verbatim() {
        let mut widgets = RouteNode::root();
        widgets.push(RouteNode::route("/list", [Method::GET]));
        let mut root = RouteNode::root();
        root.push(widgets.mounted_at("/api/widgets"));

        assert_eq!(list_endpoints(&root), vec!["GET /api/widgets/list"]);
    }

    #[test]
    fn multi_method_routes_expand_per_handler() {
        let mut root = RouteNode::root();
        root.push(RouteNode::route(
            "/items/:id",
            [Method::GET, Method::PUT, Method::DELETE],
        ));
        assert_eq!(
            list_endpoints(&root),
            vec!["DELETE /items/:id", "GET /items/:id", "PUT /items/:id"]
        );
    }

    #[test]
    fn nested_prefixes_accumulate_and_slashes_collapse() {
        let mut inner = RouteNode::root();
        inner.push(RouteNode::route("/", [Method::POST]));
        inner.push(RouteNode::route("deep//leaf/", [Method::GET]));
        let mut mid = RouteNode::root();
        mid.push(inner.mounted_at("/b/"));
        let mut root = RouteNode::root();
        root.push(mid.mounted_at("/a"));
        root.push(RouteNode::route("/", [Method::GET]));

        assert_eq!(
            list_endpoints(&root),
            vec!["GET /", "GET /a/b/deep/leaf", "POST /a/b"]
        );
    }

    #[test]
    fn duplicates_are_collapsed() {
        let mut root = RouteNode::root();
        root.push(RouteNode::route("/x", [Method::GET]));
        root.push(RouteNode::route("x", [Method::GET, Method::GET]));
        assert_eq!(list_endpoints(&root), vec!["GET /x"]);
    }

    #[test]
    fn opaque_services_become_markers() {
        let mut root = RouteNode::root();
        root.push(RouteNode::opaque("/assets", "static-files"));
        assert_eq!(
            list_endpoints(&root),
            vec!["ANY /assets/<complex:static-files>"]
        );
    }

    #[test]
    fn merge_flattens_unprefixed_routers() {
        let mut a = RouteNode::root();
        a.push(RouteNode::route("/one", [Method::GET]));
        let mut b = RouteNode::root();
        b.push(RouteNode::route("/two", [Method::POST]));
        a.absorb(b);
        assert_eq!(list_endpoints(&a), vec!["GET /one", "POST /two"]);
    }

    #[test]
    fn empty_tree_has_no_endpoints() {
        assert!(list_endpoints(&RouteNode::root()).is_empty());
    }
}
