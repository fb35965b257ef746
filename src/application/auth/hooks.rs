use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::User;

/// Raised by a hook when its storage backend failed. The underlying error has
/// already been logged by the hook implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("auth hook `{hook}` failed")]
pub struct HookFailure {
    pub hook: &'static str,
}

pub type HookResult<T> = Result<T, HookFailure>;

/// Outcome of an interception policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    Proceed,
    Block,
}

impl Interception {
    pub fn is_blocked(self) -> bool {
        matches!(self, Interception::Block)
    }
}

/// Registration attempt as seen by the `register` policy.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
}

/// Data-access and policy hooks the authenticator depends on.
#[async_trait]
pub trait AuthHooks: Send + Sync {
    async fn get_user_by_mail(&self, email: &str) -> HookResult<Option<User>>;
    async fn get_user_by_name(&self, username: &str) -> HookResult<Option<User>>;
    /// `Ok(false)` when the email or username was taken concurrently.
    async fn store_user(&self, user: &User) -> HookResult<bool>;
    async fn check_token(&self, token: &str) -> HookResult<bool>;
    async fn store_token(&self, token: &str) -> HookResult<()>;
    async fn delete_token(&self, token: &str) -> HookResult<()>;

    async fn intercept_register(&self, _attempt: &Registration) -> Interception {
        Interception::Proceed
    }

    async fn intercept_login(&self, _user_id: Uuid) -> Interception {
        Interception::Proceed
    }
}
