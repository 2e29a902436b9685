//! Unifies API for accessing accounts.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Chair, ChairId, ChairModel, NewChair, NewUser, User, UserId},
    traits::{AccountApiError, AccountManagement},
};

/// The `AccountApi` provides access to the user and chair accounts the dispatch core depends on.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Resolves a rider session token. Returns `None` if no user holds it.
    pub async fn user_by_token(&self, token: &str) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user_by_token(token).await
    }

    /// Resolves a chair session token. Returns `None` if no chair holds it.
    pub async fn chair_by_token(&self, token: &str) -> Result<Option<Chair>, AccountApiError> {
        self.db.fetch_chair_by_token(token).await
    }

    pub async fn chair(&self, chair_id: ChairId) -> Result<Option<Chair>, AccountApiError> {
        self.db.fetch_chair(chair_id).await
    }

    pub async fn register_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let user = self.db.create_user(user).await?;
        info!("🗃️ New rider registered: {} ({})", user.id, user.display_name());
        Ok(user)
    }

    pub async fn register_chair(&self, chair: NewChair) -> Result<Chair, AccountApiError> {
        let chair = self.db.create_chair(chair).await?;
        info!("🗃️ New chair registered: {} ({})", chair.id, chair.name);
        Ok(chair)
    }

    pub async fn upsert_chair_model(&self, model: ChairModel) -> Result<(), AccountApiError> {
        self.db.upsert_chair_model(model).await
    }

    pub async fn set_chair_activity(&self, chair_id: ChairId, is_active: bool) -> Result<(), AccountApiError> {
        self.db.set_chair_activity(chair_id, is_active).await
    }

    pub async fn save_payment_token(&self, user_id: UserId, token: &str) -> Result<(), AccountApiError> {
        self.db.save_payment_token(user_id, token).await
    }

    pub async fn payment_token(&self, user_id: UserId) -> Result<Option<String>, AccountApiError> {
        self.db.fetch_payment_token(user_id).await
    }
}
