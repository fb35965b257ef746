//! In-memory port implementations for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::token_store::TokenStore;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::User;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().collect()),
        }
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| pred(u)).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find(|u| u.email == email))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find(|u| u.username == username))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.find(|u| u.id == id))
    }

    async fn create_user(&self, user: &User) -> anyhow::Result<bool> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Ok(false);
        }
        users.push(user.clone());
        Ok(true)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashSet<String>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn contains(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.tokens.lock().unwrap().contains(token))
    }

    async fn insert(&self, token: &str) -> anyhow::Result<()> {
        self.tokens.lock().unwrap().insert(token.to_string());
        Ok(())
    }

    async fn remove(&self, token: &str) -> anyhow::Result<()> {
        self.tokens.lock().unwrap().remove(token);
        Ok(())
    }
}

/// Every call fails, as if the backend were unreachable.
pub struct FailingStore;

#[async_trait]
impl UserRepository for FailingStore {
    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn create_user(&self, _user: &User) -> anyhow::Result<bool> {
        anyhow::bail!("connection refused")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

#[async_trait]
impl TokenStore for FailingStore {
    async fn contains(&self, _token: &str) -> anyhow::Result<bool> {
        anyhow::bail!("connection refused")
    }

    async fn insert(&self, _token: &str) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn remove(&self, _token: &str) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}
