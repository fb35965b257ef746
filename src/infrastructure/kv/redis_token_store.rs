use anyhow::Context;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::application::ports::token_store::TokenStore;

/// Session tokens kept as members of a single Redis set.
#[derive(Clone)]
pub struct RedisTokenStore {
    conn: ConnectionManager,
    set_name: String,
}

impl RedisTokenStore {
    pub async fn connect(redis_url: &str, set_name: impl Into<String>) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url).context("redis_client_open")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("redis_connection_manager")?;
        Ok(Self {
            conn,
            set_name: set_name.into(),
        })
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn contains(&self, token: &str) -> anyhow::Result<bool> {
        let mut conn = self.conn.clone();
        let found: bool = conn
            .sismember(&self.set_name, token)
            .await
            .context("redis_sismember")?;
        Ok(found)
    }

    async fn insert(&self, token: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .sadd(&self.set_name, token)
            .await
            .context("redis_sadd")?;
        Ok(())
    }

    async fn remove(&self, token: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .srem(&self.set_name, token)
            .await
            .context("redis_srem")?;
        Ok(())
    }
}
