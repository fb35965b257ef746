use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::auth::hooks::{
    AuthHooks, HookFailure, HookResult, Interception, Registration,
};
use crate::application::ports::token_store::TokenStore;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::User;

/// Connects the authenticator's hooks to the user document store and the
/// session-token set.
#[derive(Clone)]
pub struct AuthBridge {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenStore>,
}

impl AuthBridge {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { users, tokens }
    }
}

fn settle<T>(hook: &'static str, result: anyhow::Result<T>) -> HookResult<T> {
    result.map_err(|e| {
        tracing::error!(hook, error = ?e, "auth_hook_failed");
        HookFailure { hook }
    })
}

#[async_trait]
impl AuthHooks for AuthBridge {
    async fn get_user_by_mail(&self, email: &str) -> HookResult<Option<User>> {
        settle("getUserByMail", self.users.find_by_email(email).await)
    }

    async fn get_user_by_name(&self, username: &str) -> HookResult<Option<User>> {
        settle("getUserByName", self.users.find_by_username(username).await)
    }

    async fn store_user(&self, user: &User) -> HookResult<bool> {
        settle("storeUser", self.users.create_user(user).await)
    }

    async fn check_token(&self, token: &str) -> HookResult<bool> {
        settle("checkToken", self.tokens.contains(token).await)
    }

    async fn store_token(&self, token: &str) -> HookResult<()> {
        settle("storeToken", self.tokens.insert(token).await)
    }

    async fn delete_token(&self, token: &str) -> HookResult<()> {
        settle("deleteToken", self.tokens.remove(token).await)
    }

    async fn intercept_register(&self, attempt: &Registration) -> Interception {
        tracing::info!(email = %attempt.email, "register_blocked");
        Interception::Block
    }

    async fn intercept_login(&self, user_id: Uuid) -> Interception {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) if user.active => Interception::Proceed,
            Ok(Some(_)) => {
                tracing::info!(%user_id, "login_blocked_inactive");
                Interception::Block
            }
            Ok(None) => {
                tracing::info!(%user_id, "login_blocked_unknown_user");
                Interception::Block
            }
            Err(e) => {
                tracing::error!(%user_id, error = ?e, "login_policy_lookup_failed");
                Interception::Block
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FailingStore, MemoryTokenStore, MemoryUserRepository};

    fn user(active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            username: "ada".into(),
            hashed_password: "x".into(),
            active,
        }
    }

    fn bridge(users: MemoryUserRepository) -> AuthBridge {
        AuthBridge::new(Arc::new(users), Arc::new(MemoryTokenStore::default()))
    }

    #[tokio::test]
    async fn token_membership_follows_store_and_delete() {
        let bridge = bridge(MemoryUserRepository::default());

        assert_eq!(bridge.check_token("t-1").await, Ok(false));
        bridge.store_token("t-1").await.unwrap();
        assert_eq!(bridge.check_token("t-1").await, Ok(true));
        assert_eq!(bridge.check_token("t-2").await, Ok(false));

        bridge.delete_token("t-1").await.unwrap();
        assert_eq!(bridge.check_token("t-1").await, Ok(false));
    }

    #[tokio::test]
    async fn users_are_found_by_mail_and_name() {
        let bridge = bridge(MemoryUserRepository::default());
        let u = user(true);
        assert_eq!(bridge.store_user(&u).await, Ok(true));

        let by_mail = bridge.get_user_by_mail("ada@example.com").await.unwrap();
        assert_eq!(by_mail.map(|x| x.id), Some(u.id));
        let by_name = bridge.get_user_by_name("ada").await.unwrap();
        assert_eq!(by_name.map(|x| x.id), Some(u.id));
        assert!(bridge.get_user_by_name("grace").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn storing_a_taken_email_reports_not_stored() {
        let bridge = bridge(MemoryUserRepository::with_users([user(true)]));
        let mut clash = user(true);
        clash.username = "other".into();
        assert_eq!(bridge.store_user(&clash).await, Ok(false));
    }

    #[tokio::test]
    async fn login_is_blocked_for_missing_user() {
        let bridge = bridge(MemoryUserRepository::default());
        assert_eq!(
            bridge.intercept_login(Uuid::new_v4()).await,
            Interception::Block
        );
    }

    #[tokio::test]
    async fn login_is_blocked_for_inactive_user() {
        let u = user(false);
        let bridge = bridge(MemoryUserRepository::with_users([u.clone()]));
        assert_eq!(bridge.intercept_login(u.id).await, Interception::Block);
    }

    #[tokio::test]
    async fn login_proceeds_for_active_user() {
        let u = user(true);
        let bridge = bridge(MemoryUserRepository::with_users([u.clone()]));
        assert_eq!(bridge.intercept_login(u.id).await, Interception::Proceed);
    }

    #[tokio::test]
    async fn register_is_always_blocked() {
        let bridge = bridge(MemoryUserRepository::default());
        for (email, username) in [("a@b.c", "a"), ("", ""), ("ada@example.com", "ada")] {
            let attempt = Registration {
                email: email.into(),
                username: username.into(),
            };
            assert_eq!(
                bridge.intercept_register(&attempt).await,
                Interception::Block
            );
        }
    }

    #[tokio::test]
    async fn backend_errors_become_hook_failures() {
        let bridge = AuthBridge::new(Arc::new(FailingStore), Arc::new(FailingStore));

        assert_eq!(
            bridge.get_user_by_mail("a@b.c").await.unwrap_err().hook,
            "getUserByMail"
        );
        assert_eq!(
            bridge.get_user_by_name("a").await.unwrap_err().hook,
            "getUserByName"
        );
        assert!(bridge.store_user(&user(true)).await.is_err());
        assert_eq!(
            bridge.check_token("t").await,
            Err(HookFailure { hook: "checkToken" })
        );
        assert!(bridge.store_token("t").await.is_err());
        assert!(bridge.delete_token("t").await.is_err());
        assert_eq!(
            bridge.intercept_login(Uuid::new_v4()).await,
            Interception::Block
        );
    }
}
