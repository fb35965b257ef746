use std::sync::Arc;

use axum::{Router, extract::MatchedPath, http::Method};
use http::HeaderValue;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::introspection::{RouteNode, list_endpoints};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::infrastructure::realtime::NamespaceRegistry;
use crate::presentation::http::admin::{self, AdminState, Catalog};
use crate::presentation::http::auth::{self, AuthGuard};
use crate::presentation::http::health;
use crate::presentation::http::openapi::ApiDoc;
use crate::presentation::http::routing::TrackedRouter;
use crate::presentation::modules::{ModuleContext, ModuleDescriptor, ModuleRegistry, RegistryError};
use crate::presentation::ws;

pub const AUTH_MODULE: &str = "auth";

/// Owns module registration and assembles the HTTP dispatcher.
pub struct Core {
    ctx: AppContext,
    guard: AuthGuard,
    registry: ModuleRegistry,
}

impl Core {
    /// Creates the core with the built-in auth module already registered.
    pub fn new(ctx: AppContext) -> Result<Self, RegistryError> {
        let guard = AuthGuard::new(ctx.authenticator());
        let mut registry = ModuleRegistry::new();
        let descriptor = ModuleDescriptor {
            name: AUTH_MODULE.into(),
            path: AUTH_MODULE.into(),
            router: auth::routes(ctx.clone()),
        };
        registry.insert(descriptor, Some(&ctx.cfg.auth_prefix))?;
        Ok(Self {
            ctx,
            guard,
            registry,
        })
    }

    pub fn module_context(&self) -> ModuleContext {
        ModuleContext::new(self.guard.clone(), self.ctx.namespaces())
    }

    /// Instantiates a module and mounts it under `/api/<path>`. Fails when
    /// the name or path is already taken.
    pub fn register<F>(&mut self, factory: F) -> Result<(), RegistryError>
    where
        F: FnOnce(ModuleContext) -> ModuleDescriptor,
    {
        let module_ctx = self.module_context();
        let span = module_ctx.span().clone();
        let descriptor = factory(module_ctx);
        let mounted = self.registry.insert(descriptor, None)?;
        span.record("module", mounted.name.as_str());
        info!(module = %mounted.name, mount = %mounted.mount, "module_registered");
        Ok(())
    }

    pub fn module_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Builds the final router. The endpoint catalogue served by `/info` is
    /// computed here and does not change afterwards.
    pub fn into_router(self) -> Router {
        let Core { ctx, registry, .. } = self;
        let cfg = ctx.cfg.clone();
        let modules = registry.names();

        let mut app = TrackedRouter::new().merge(health::routes(ctx.clone()));
        for module in registry.into_modules() {
            app = app.nest(&module.mount, module.router);
        }

        let admin_routes = admin::routes();
        let mut tree = app.tree().clone();
        tree.absorb(admin_routes.tree().clone());
        tree.push(RouteNode::route("/openapi.json", [Method::GET]));
        tree.push(RouteNode::opaque("/docs", "swagger-ui"));
        let catalog = Catalog {
            modules,
            endpoints: list_endpoints(&tree),
        };

        let app = app.merge(admin_routes.with_state(AdminState {
            ctx,
            catalog: Arc::new(catalog),
        }));
        let (router, _) = app.into_parts();

        router
            .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
            .layer(cors_layer(&cfg))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let matched = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default();
                    tracing::info_span!("http", %method, %uri, matched_path = %matched)
                }),
            )
    }

    /// Serves the HTTP dispatcher and, when given, the realtime listener until
    /// either task ends.
    pub async fn serve(
        self,
        listener: TcpListener,
        realtime: Option<(TcpListener, NamespaceRegistry)>,
    ) -> anyhow::Result<()> {
        let app = self.into_router();

        let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
            axum::serve(listener, app).await?;
            Ok(())
        });

        let rt_handle: Option<JoinHandle<anyhow::Result<()>>> =
            realtime.map(|(listener, registry)| {
                info!(namespaces = ?registry.paths(), "realtime_namespaces");
                tokio::spawn(async move {
                    axum::serve(listener, ws::namespaces::routes(registry)).await?;
                    Ok(())
                })
            });

        match api_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(?e, "API server task failed"),
            Err(e) => error!(?e, "API server task panicked"),
        }

        if let Some(handle) = rt_handle {
            handle.abort();
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(?e, "Realtime server task failed"),
                Err(e) if e.is_cancelled() => {}
                Err(e) => error!(?e, "Realtime server task panicked"),
            }
        }
        Ok(())
    }
}

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);

    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        _ if cfg.is_production => {
            // FRONTEND_URL is validated at startup; an unparsable value denies all origins.
            base.allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
        }
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}
