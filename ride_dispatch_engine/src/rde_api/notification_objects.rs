use dispatch_common::Fare;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ChairId, Coordinate, RideId, RideStatusType, UserId},
    traits::{ChairNotice, RiderNotice},
};

/// The envelope sent on the chair notification stream. `data` is null when the chair has no ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairNotification {
    pub data: Option<ChairNotificationData>,
    pub retry_after_ms: u64,
}

impl ChairNotification {
    pub fn new(data: Option<ChairNotificationData>, retry_after_ms: u64) -> Self {
        Self { data, retry_after_ms }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderSummary {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairNotificationData {
    pub ride_id: RideId,
    pub user: RiderSummary,
    pub pickup_coordinate: Coordinate,
    pub destination_coordinate: Coordinate,
    pub status: RideStatusType,
}

impl From<ChairNotice> for ChairNotificationData {
    fn from(notice: ChairNotice) -> Self {
        Self {
            ride_id: notice.ride.id,
            user: RiderSummary { id: notice.rider.id, name: notice.rider.display_name() },
            pickup_coordinate: notice.ride.pickup,
            destination_coordinate: notice.ride.destination,
            status: notice.status.status,
        }
    }
}

/// The reply to a rider's notification poll. `data` is null when the rider has never requested a ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderNotification {
    pub data: Option<RiderNotificationData>,
    pub retry_after_ms: u64,
}

impl RiderNotification {
    pub fn new(data: Option<RiderNotificationData>, retry_after_ms: u64) -> Self {
        Self { data, retry_after_ms }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairSummary {
    pub id: ChairId,
    pub name: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderNotificationData {
    pub ride_id: RideId,
    pub pickup_coordinate: Coordinate,
    pub destination_coordinate: Coordinate,
    pub fare: Fare,
    pub status: RideStatusType,
    pub chair: Option<ChairSummary>,
    /// Epoch milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<RiderNotice> for RiderNotificationData {
    fn from(notice: RiderNotice) -> Self {
        let RiderNotice { ride, status, chair } = notice;
        Self {
            ride_id: ride.id,
            pickup_coordinate: ride.pickup,
            destination_coordinate: ride.destination,
            fare: ride.fare,
            status: status.status,
            chair: chair.map(|c| ChairSummary { id: c.id, name: c.name, model: c.model }),
            created_at: ride.created_at.timestamp_millis(),
            updated_at: ride.updated_at.timestamp_millis(),
        }
    }
}
