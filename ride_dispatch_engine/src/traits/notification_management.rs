use thiserror::Error;

use crate::{
    db_types::{ChairId, UserId},
    events::ChairEvent,
    traits::{ChairNotice, RiderNotice},
};

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The notification hub has been shut down")]
    HubClosed,
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        NotificationError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    /// Reports the latest status of the chair's most recent ride, and acknowledges it as delivered, along with every
    /// earlier status of that ride. Returns `None` if the chair has never been assigned a ride.
    async fn chair_snapshot(&self, chair_id: ChairId) -> Result<Option<ChairNotice>, NotificationError>;

    /// Marks the status announced by `event` as delivered to the chair, along with every earlier undelivered status of
    /// the same ride.
    ///
    /// Returns `None` if the status had already been delivered. A second delivery is a no-op, not an error.
    async fn deliver_chair_event(
        &self,
        chair_id: ChairId,
        event: &ChairEvent,
    ) -> Result<Option<ChairNotice>, NotificationError>;

    /// The user's most recent ride and its latest status, straight from the store.
    async fn rider_snapshot(&self, user_id: UserId) -> Result<Option<RiderNotice>, NotificationError>;
}
