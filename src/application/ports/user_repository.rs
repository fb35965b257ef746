use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::User;

/// Document-store access to the user collection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Inserts the user. Returns `false` when the email or username is
    /// already taken and nothing was written.
    async fn create_user(&self, user: &User) -> anyhow::Result<bool>;
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
