use async_trait::async_trait;

/// The authentication service's view of the signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user_id(&self) -> Option<String>;
}
