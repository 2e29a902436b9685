use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ChairId, Coordinate, NewRide, Ride, RideId, RideStatus, RideStatusType, UserId},
    events::{ChairEvent, NotificationHub},
    helpers::estimate_fare,
    traits::{LocationUpdate, RideFlowError, RideFlowManagement, StatusChange},
};

/// `RideFlowApi` is the primary API for moving rides through their lifecycle.
///
/// Every status the backend records is published to the ride's chair after the backend call returns, i.e. after the
/// transaction that recorded it has committed.
pub struct RideFlowApi<B> {
    db: B,
    hub: NotificationHub,
}

impl<B> Debug for RideFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RideFlowApi")
    }
}

impl<B> RideFlowApi<B>
where B: RideFlowManagement
{
    pub fn new(db: B, hub: NotificationHub) -> Self {
        Self { db, hub }
    }

    /// Quotes the fare for the trip and stores the request. The ride waits in `MATCHING` until a matching pass picks
    /// it up.
    pub async fn request_ride(
        &self,
        user_id: UserId,
        pickup: Coordinate,
        destination: Coordinate,
    ) -> Result<StatusChange, RideFlowError> {
        let fare = estimate_fare(pickup, destination);
        let change = self.db.insert_ride(NewRide::new(user_id, pickup, destination, fare)).await?;
        info!("🔄️ {user_id} requested {} from {pickup} to {destination}. Fare: {fare}", change.ride.id);
        Ok(change)
    }

    /// Records the chair's new position. If the position moves the chair's ride to `PICKUP` or `ARRIVED`, the new
    /// status is announced to the chair.
    pub async fn report_location(
        &self,
        chair_id: ChairId,
        coordinate: Coordinate,
    ) -> Result<LocationUpdate, RideFlowError> {
        let update = self.db.record_chair_location(chair_id, coordinate).await?;
        if let Some(change) = &update.change {
            self.announce(change);
        }
        Ok(update)
    }

    /// A status change requested by the chair (`ENROUTE` or `CARRYING`).
    pub async fn update_ride_status(
        &self,
        chair_id: ChairId,
        ride_id: RideId,
        status: RideStatusType,
    ) -> Result<StatusChange, RideFlowError> {
        let change = self.db.apply_chair_status(chair_id, ride_id, status).await?;
        self.announce(&change);
        Ok(change)
    }

    /// The rider rates the ride, which completes it.
    pub async fn evaluate_ride(
        &self,
        user_id: UserId,
        ride_id: RideId,
        evaluation: i64,
    ) -> Result<StatusChange, RideFlowError> {
        if !(1..=5).contains(&evaluation) {
            return Err(RideFlowError::InvalidEvaluation(evaluation));
        }
        let change = self.db.complete_ride(user_id, ride_id, evaluation).await?;
        info!("🔄️ {ride_id} completed with a rating of {evaluation}");
        self.announce(&change);
        Ok(change)
    }

    pub async fn cancel_ride(&self, user_id: UserId, ride_id: RideId) -> Result<StatusChange, RideFlowError> {
        let change = self.db.cancel_ride(user_id, ride_id).await?;
        info!("🔄️ {ride_id} canceled by {user_id}");
        self.announce(&change);
        Ok(change)
    }

    pub async fn ride(&self, ride_id: RideId) -> Result<Option<Ride>, RideFlowError> {
        self.db.fetch_ride(ride_id).await
    }

    pub async fn ride_statuses(&self, ride_id: RideId) -> Result<Vec<RideStatus>, RideFlowError> {
        self.db.fetch_ride_statuses(ride_id).await
    }

    /// The user's completed rides, oldest first.
    pub async fn completed_rides(&self, user_id: UserId) -> Result<Vec<Ride>, RideFlowError> {
        self.db.fetch_completed_rides(user_id).await
    }

    fn announce(&self, change: &StatusChange) {
        match change.ride.chair_id {
            Some(chair_id) => self.hub.publish(chair_id, ChairEvent::from(&change.status)),
            None => trace!("🔄️ {} has no chair yet. {} is not announced", change.ride.id, change.status.status),
        }
    }
}
