// Module layout (Clean Architecture style)
// - bootstrap: configuration, wiring and the module-hosting core
// - infrastructure: Postgres/Redis adapters and realtime namespaces
// - presentation: HTTP/WS handlers, tracked routing and the module registry
// - application: auth library, auth bridge, route introspection, ports
// - domain: core models
// - modules: feature modules shipped with the core

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod presentation;
