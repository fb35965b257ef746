use async_trait::async_trait;

/// Set-membership store holding the currently valid session tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn contains(&self, token: &str) -> anyhow::Result<bool>;
    async fn insert(&self, token: &str) -> anyhow::Result<()>;
    async fn remove(&self, token: &str) -> anyhow::Result<()>;
}
