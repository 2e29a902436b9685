use thiserror::Error;

use crate::{
    db_types::{ChairId, Coordinate, NewRide, Ride, RideId, RideStatus, RideStatusType, UserId},
    helpers::TransitionError,
    traits::{LocationUpdate, StatusChange},
};

#[derive(Debug, Clone, Error)]
pub enum RideFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0} does not exist")]
    RideNotFound(RideId),
    #[error("not assigned to this ride")]
    NotAssigned,
    #[error("ride does not belong to this user")]
    NotOwner,
    #[error("{0}")]
    InvalidState(#[from] TransitionError),
    #[error("user already has a ride in progress")]
    RideInProgress,
    #[error("evaluation must be between 1 and 5, not {0}")]
    InvalidEvaluation(i64),
}

impl From<sqlx::Error> for RideFlowError {
    fn from(e: sqlx::Error) -> Self {
        RideFlowError::DatabaseError(e.to_string())
    }
}

/// Records rides and moves them through their lifecycle.
///
/// Every method that can insert a status must evaluate the transition rules ([`crate::helpers::validate_transition`]
/// or [`crate::helpers::implicit_transition`]) against the latest status *after* taking the write lock for the ride,
/// and insert the new status in the same transaction.
#[allow(async_fn_in_trait)]
pub trait RideFlowManagement {
    /// Stores a new, unmatched ride along with its initial `MATCHING` status.
    ///
    /// Fails with [`RideFlowError::RideInProgress`] if the user has a ride that is neither completed nor canceled.
    async fn insert_ride(&self, ride: NewRide) -> Result<StatusChange, RideFlowError>;

    /// Appends a location sample for the chair, advances its odometer, and applies any `PICKUP` or `ARRIVED`
    /// transition the new position triggers on the chair's current ride.
    async fn record_chair_location(
        &self,
        chair_id: ChairId,
        coordinate: Coordinate,
    ) -> Result<LocationUpdate, RideFlowError>;

    /// Applies an explicit transition requested by the ride's chair.
    async fn apply_chair_status(
        &self,
        chair_id: ChairId,
        ride_id: RideId,
        status: RideStatusType,
    ) -> Result<StatusChange, RideFlowError>;

    /// Stores the rider's evaluation and moves the ride to `COMPLETED`.
    async fn complete_ride(
        &self,
        user_id: UserId,
        ride_id: RideId,
        evaluation: i64,
    ) -> Result<StatusChange, RideFlowError>;

    async fn cancel_ride(&self, user_id: UserId, ride_id: RideId) -> Result<StatusChange, RideFlowError>;

    async fn fetch_ride(&self, ride_id: RideId) -> Result<Option<Ride>, RideFlowError>;

    /// The ride's status history, in insertion order.
    async fn fetch_ride_statuses(&self, ride_id: RideId) -> Result<Vec<RideStatus>, RideFlowError>;

    /// The user's completed rides, oldest first.
    async fn fetch_completed_rides(&self, user_id: UserId) -> Result<Vec<Ride>, RideFlowError>;
}
