use std::sync::Arc;

use crate::application::auth::Authenticator;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::infrastructure::realtime::NamespaceRegistry;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    authenticator: Arc<Authenticator>,
    user_repo: Arc<dyn UserRepository>,
    namespaces: Option<NamespaceRegistry>,
}

impl AppServices {
    pub fn new(
        authenticator: Arc<Authenticator>,
        user_repo: Arc<dyn UserRepository>,
        namespaces: Option<NamespaceRegistry>,
    ) -> Self {
        Self {
            authenticator,
            user_repo,
            namespaces,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn authenticator(&self) -> Arc<Authenticator> {
        self.services.authenticator.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn namespaces(&self) -> Option<NamespaceRegistry> {
        self.services.namespaces.clone()
    }
}
