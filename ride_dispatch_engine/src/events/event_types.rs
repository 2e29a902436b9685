use serde::{Deserialize, Serialize};

use crate::db_types::{RideId, RideStatus, RideStatusType};

/// A status change waiting to be delivered to a chair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairEvent {
    pub ride_id: RideId,
    /// The id of the `ride_statuses` row this event announces.
    pub status_id: i64,
    pub status: RideStatusType,
}

impl From<&RideStatus> for ChairEvent {
    fn from(status: &RideStatus) -> Self {
        Self { ride_id: status.ride_id, status_id: status.id, status: status.status }
    }
}
