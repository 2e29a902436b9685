use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Chair, ChairId, ChairLocation, Ride, RideId, RideStatus, User},
    helpers::Cost,
};

/// A status that was just recorded, and the ride it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub ride: Ride,
    pub status: RideStatus,
}

impl StatusChange {
    pub fn new(ride: Ride, status: RideStatus) -> Self {
        Self { ride, status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub location: ChairLocation,
    /// Set if the new position moved the chair's ride into `PICKUP` or `ARRIVED`.
    pub change: Option<StatusChange>,
}

/// A ride assignment committed by a matching pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub ride_id: RideId,
    pub chair_id: ChairId,
    pub cost: Cost,
    pub latest_status: RideStatus,
}

/// Everything a chair needs to know about its current ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChairNotice {
    pub ride: Ride,
    pub rider: User,
    pub status: RideStatus,
}

/// Everything a rider needs to know about their latest ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderNotice {
    pub ride: Ride,
    pub status: RideStatus,
    pub chair: Option<Chair>,
}
