use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use baas_core::application::auth::{AuthBridge, Authenticator, TokenSettings};
use baas_core::application::ports::token_store::TokenStore;
use baas_core::application::ports::user_repository::UserRepository;
use baas_core::bootstrap::app_context::{AppContext, AppServices};
use baas_core::bootstrap::config::Config;
use baas_core::bootstrap::server::Core;
use baas_core::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use baas_core::infrastructure::kv::RedisTokenStore;
use baas_core::infrastructure::realtime::NamespaceRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "baas_core=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        api_port = cfg.api_port,
        realtime_port = ?cfg.realtime_port,
        auth_prefix = %cfg.auth_prefix,
        production = cfg.is_production,
        "Starting BaaS core"
    );

    // HTTP listener first; it only accepts traffic once modules are mounted.
    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    info!(%api_addr, "HTTP API listening");

    let token_store = RedisTokenStore::connect(&cfg.redis_url, cfg.token_set_name.clone()).await?;
    info!(set = %token_store.set_name(), "Key/value store connected");

    let pool = baas_core::infrastructure::db::connect_pool(&cfg.database_url).await?;
    baas_core::infrastructure::db::migrate(&pool).await?;
    info!("Document store connected");

    let realtime = match cfg.realtime_port {
        Some(port) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let rt_listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "Realtime server listening");
            Some((rt_listener, NamespaceRegistry::new()))
        }
        None => {
            info!("realtime_disabled");
            None
        }
    };

    let user_repo: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool));
    let token_store: Arc<dyn TokenStore> = Arc::new(token_store);
    let bridge = AuthBridge::new(user_repo.clone(), token_store);
    let authenticator = Authenticator::new(
        Arc::new(bridge),
        TokenSettings {
            secret: cfg.jwt_secret.clone(),
            expires_secs: cfg.jwt_expires_secs,
        },
    );

    let services = AppServices::new(
        Arc::new(authenticator),
        user_repo,
        realtime.as_ref().map(|(_, registry)| registry.clone()),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let mut core = Core::new(ctx)?;
    for (name, factory) in baas_core::modules::builtin() {
        if cfg.module_enabled(name) {
            core.register(factory)?;
        } else {
            info!(module = name, "module_disabled");
        }
    }
    info!(modules = ?core.module_names(), "modules_mounted");

    core.serve(listener, realtime).await
}
