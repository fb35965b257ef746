use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::auth::hooks::{AuthHooks, HookFailure, Registration};
use crate::domain::users::{SessionUser, User};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("registration is disabled")]
    RegistrationDisabled,
    #[error("login is disabled for this account")]
    LoginBlocked,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email or username already taken")]
    AlreadyExists,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Backend(#[from] HookFailure),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub expires_secs: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub email: String,
    pub username: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

/// Password and session-token handling on top of [`AuthHooks`].
#[derive(Clone)]
pub struct Authenticator {
    hooks: Arc<dyn AuthHooks>,
    settings: TokenSettings,
}

impl Authenticator {
    pub fn new(hooks: Arc<dyn AuthHooks>, settings: TokenSettings) -> Self {
        Self { hooks, settings }
    }

    /// Self-service registration, subject to the `register` policy.
    pub async fn register(&self, req: &NewAccount) -> Result<SessionUser, AuthError> {
        let attempt = Registration {
            email: req.email.clone(),
            username: req.username.clone(),
        };
        if self.hooks.intercept_register(&attempt).await.is_blocked() {
            return Err(AuthError::RegistrationDisabled);
        }
        self.create_account(req, true).await
    }

    /// Administrative account creation. Bypasses the `register` policy.
    pub async fn provision(&self, req: &NewAccount, active: bool) -> Result<SessionUser, AuthError> {
        self.create_account(req, active).await
    }

    async fn create_account(&self, req: &NewAccount, active: bool) -> Result<SessionUser, AuthError> {
        let email = req.email.trim();
        let username = req.username.trim();
        if !email.contains('@') {
            return Err(AuthError::Validation("email must contain '@'".into()));
        }
        if username.is_empty() || username.contains('@') {
            return Err(AuthError::Validation(
                "username must be non-empty and must not contain '@'".into(),
            ));
        }
        if req.password.is_empty() {
            return Err(AuthError::Validation("password must not be empty".into()));
        }

        if self.hooks.get_user_by_mail(email).await?.is_some()
            || self.hooks.get_user_by_name(username).await?.is_some()
        {
            return Err(AuthError::AlreadyExists);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            hashed_password,
            active,
        };
        if !self.hooks.store_user(&user).await? {
            // Taken by a concurrent insert since the lookups above.
            return Err(AuthError::AlreadyExists);
        }
        tracing::info!(user_id = %user.id, "user_created");
        Ok(SessionUser::from(&user))
    }

    /// `login` is an email address when it contains `@`, a username otherwise.
    pub async fn login(&self, login: &str, password: &str) -> Result<Session, AuthError> {
        let login = login.trim();
        let found = if login.contains('@') {
            self.hooks.get_user_by_mail(login).await?
        } else {
            self.hooks.get_user_by_name(login).await?
        };
        let user = found.ok_or(AuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&user.hashed_password)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AuthError::InvalidCredentials);
        }

        if self.hooks.intercept_login(user.id).await.is_blocked() {
            return Err(AuthError::LoginBlocked);
        }

        let session_user = SessionUser::from(&user);
        let token = self.issue(&session_user)?;
        self.hooks.store_token(&token).await?;
        Ok(Session {
            token,
            expires_in: self.settings.expires_secs,
            user: session_user,
        })
    }

    /// Revokes a session. Tokens that do not verify are rejected without
    /// touching the token set.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.decode(token)?;
        self.hooks.delete_token(token).await?;
        Ok(())
    }

    /// Resolves a bearer token to its user. The token must carry a valid
    /// signature and still be a member of the token set.
    pub async fn authenticate(&self, token: &str) -> Result<SessionUser, AuthError> {
        let claims = self.decode(token)?;
        if !self.hooks.check_token(token).await? {
            return Err(AuthError::Unauthorized);
        }
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)?;
        Ok(SessionUser {
            id,
            email: claims.email,
            username: claims.username,
        })
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::Unauthorized)
    }

    fn issue(&self, user: &SessionUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            exp: now + (self.settings.expires_secs.max(0) as usize),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::auth::bridge::AuthBridge;
    use crate::application::auth::hooks::{HookResult, Interception};
    use crate::application::testing::{MemoryTokenStore, MemoryUserRepository};

    fn settings() -> TokenSettings {
        TokenSettings {
            secret: "test-secret".into(),
            expires_secs: 3600,
        }
    }

    fn account(email: &str, username: &str) -> NewAccount {
        NewAccount {
            email: email.into(),
            username: username.into(),
            password: "hunter2".into(),
        }
    }

    fn bridged() -> Authenticator {
        let bridge = AuthBridge::new(
            Arc::new(MemoryUserRepository::default()),
            Arc::new(MemoryTokenStore::default()),
        );
        Authenticator::new(Arc::new(bridge), settings())
    }

    #[tokio::test]
    async fn register_is_rejected_by_policy() {
        let auth = bridged();
        let err = auth
            .register(&account("ada@example.com", "ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RegistrationDisabled));
    }

    #[tokio::test]
    async fn provisioned_user_can_log_in_and_out() {
        let auth = bridged();
        auth.provision(&account("ada@example.com", "ada"), true)
            .await
            .unwrap();

        let session = auth.login("ada", "hunter2").await.unwrap();
        assert_eq!(session.user.email, "ada@example.com");
        let me = auth.authenticate(&session.token).await.unwrap();
        assert_eq!(me, session.user);

        auth.logout(&session.token).await.unwrap();
        assert!(matches!(
            auth.authenticate(&session.token).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn login_by_mail_with_wrong_password_fails() {
        let auth = bridged();
        auth.provision(&account("ada@example.com", "ada"), true)
            .await
            .unwrap();
        assert!(auth.login("ada@example.com", "hunter2").await.is_ok());
        assert!(matches!(
            auth.login("ada@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("grace", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn inactive_user_is_blocked_at_login() {
        let auth = bridged();
        auth.provision(&account("ada@example.com", "ada"), false)
            .await
            .unwrap();
        assert!(matches!(
            auth.login("ada", "hunter2").await,
            Err(AuthError::LoginBlocked)
        ));
    }

    #[tokio::test]
    async fn duplicate_accounts_are_rejected() {
        let auth = bridged();
        auth.provision(&account("ada@example.com", "ada"), true)
            .await
            .unwrap();
        assert!(matches!(
            auth.provision(&account("ada@example.com", "other"), true).await,
            Err(AuthError::AlreadyExists)
        ));
        assert!(matches!(
            auth.provision(&account("other@example.com", "ada"), true).await,
            Err(AuthError::AlreadyExists)
        ));
        assert!(matches!(
            auth.provision(&account("not-an-email", "x"), true).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn forged_tokens_are_rejected() {
        let auth = bridged();
        let other = Authenticator::new(
            Arc::new(AuthBridge::new(
                Arc::new(MemoryUserRepository::default()),
                Arc::new(MemoryTokenStore::default()),
            )),
            TokenSettings {
                secret: "another-secret".into(),
                expires_secs: 3600,
            },
        );
        other
            .provision(&account("ada@example.com", "ada"), true)
            .await
            .unwrap();
        let session = other.login("ada", "hunter2").await.unwrap();
        assert!(matches!(
            auth.authenticate(&session.token).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            auth.authenticate("garbage").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn logout_rejects_unverifiable_tokens() {
        let auth = bridged();
        assert!(matches!(
            auth.logout("garbage").await,
            Err(AuthError::Unauthorized)
        ));
    }

    /// Lookups see no user but the insert finds one already stored.
    struct RacingHooks;

    #[async_trait::async_trait]
    impl AuthHooks for RacingHooks {
        async fn get_user_by_mail(&self, _email: &str) -> HookResult<Option<User>> {
            Ok(None)
        }
        async fn get_user_by_name(&self, _username: &str) -> HookResult<Option<User>> {
            Ok(None)
        }
        async fn store_user(&self, _user: &User) -> HookResult<bool> {
            Ok(false)
        }
        async fn check_token(&self, _token: &str) -> HookResult<bool> {
            Ok(false)
        }
        async fn store_token(&self, _token: &str) -> HookResult<()> {
            Ok(())
        }
        async fn delete_token(&self, _token: &str) -> HookResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_duplicate_insert_is_a_conflict() {
        let auth = Authenticator::new(Arc::new(RacingHooks), settings());
        assert!(matches!(
            auth.provision(&account("ada@example.com", "ada"), true).await,
            Err(AuthError::AlreadyExists)
        ));
    }

    struct DefaultHooks;

    #[async_trait::async_trait]
    impl AuthHooks for DefaultHooks {
        async fn get_user_by_mail(&self, _email: &str) -> HookResult<Option<User>> {
            Ok(None)
        }
        async fn get_user_by_name(&self, _username: &str) -> HookResult<Option<User>> {
            Ok(None)
        }
        async fn store_user(&self, _user: &User) -> HookResult<bool> {
            Err(HookFailure { hook: "storeUser" })
        }
        async fn check_token(&self, _token: &str) -> HookResult<bool> {
            Ok(false)
        }
        async fn store_token(&self, _token: &str) -> HookResult<()> {
            Ok(())
        }
        async fn delete_token(&self, _token: &str) -> HookResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn hook_failures_surface_as_backend_errors() {
        let hooks = DefaultHooks;
        assert_eq!(
            hooks
                .intercept_register(&Registration {
                    email: "a@b.c".into(),
                    username: "a".into(),
                })
                .await,
            Interception::Proceed
        );

        let auth = Authenticator::new(Arc::new(DefaultHooks), settings());
        let err = auth
            .register(&account("ada@example.com", "ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Backend(HookFailure { hook: "storeUser" })));
    }
}
