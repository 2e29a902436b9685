use thiserror::Error;

use crate::db_types::{Chair, ChairId, ChairModel, NewChair, NewUser, User, UserId};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0} does not exist")]
    ChairNotFound(ChairId),
    #[error("{0} does not exist")]
    UserNotFound(UserId),
    #[error("The account details clash with an existing account: {0}")]
    AccountExists(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Self::AccountExists(db.message().to_string()),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

/// The account state the dispatch core depends on.
///
/// Registration and session handling proper happen elsewhere. This trait covers credential lookups, the chair
/// activity flag, chair models and payment tokens.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_user_by_token(&self, access_token: &str) -> Result<Option<User>, AccountApiError>;

    async fn fetch_chair_by_token(&self, access_token: &str) -> Result<Option<Chair>, AccountApiError>;

    async fn fetch_chair(&self, chair_id: ChairId) -> Result<Option<Chair>, AccountApiError>;

    async fn create_user(&self, user: NewUser) -> Result<User, AccountApiError>;

    /// New chairs start inactive.
    async fn create_chair(&self, chair: NewChair) -> Result<Chair, AccountApiError>;

    /// Inserts the model, or updates its speed if it already exists.
    async fn upsert_chair_model(&self, model: ChairModel) -> Result<(), AccountApiError>;

    /// Chairs that are not active are never dispatched.
    async fn set_chair_activity(&self, chair_id: ChairId, is_active: bool) -> Result<(), AccountApiError>;

    async fn save_payment_token(&self, user_id: UserId, token: &str) -> Result<(), AccountApiError>;

    /// The bearer token the payment gateway knows this user by.
    async fn fetch_payment_token(&self, user_id: UserId) -> Result<Option<String>, AccountApiError>;
}
