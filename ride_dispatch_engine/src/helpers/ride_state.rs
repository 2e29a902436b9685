//! The ride state table.
//!
//! A ride moves strictly forward through [`FORWARD_STATUSES`], one status row per step, or drops into `CANCELED` from
//! any non-terminal status. Having no status rows at all is the same as `MATCHING`.
use thiserror::Error;

use crate::db_types::{Coordinate, Ride, RideStatus, RideStatusType};

pub const FORWARD_STATUSES: [RideStatusType; 6] = [
    RideStatusType::Matching,
    RideStatusType::Enroute,
    RideStatusType::Pickup,
    RideStatusType::Carrying,
    RideStatusType::Arrived,
    RideStatusType::Completed,
];

/// A ride keeps its chair busy until this many forward statuses have been delivered to the chair.
pub const EXPECTED_STATUS_COUNT: usize = FORWARD_STATUSES.len();

/// Who is asking for an explicit transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Chair,
    Rider,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid status")]
    UnsupportedStatus(RideStatusType),
    #[error("chair has not arrived yet")]
    ChairNotArrived,
    #[error("ride is already {0}")]
    RideFinished(RideStatusType),
    #[error("cannot move ride from {from} to {to}")]
    OutOfOrder { from: RideStatusType, to: RideStatusType },
}

/// The status of the most recently inserted row.
pub fn latest_status(statuses: &[RideStatus]) -> RideStatusType {
    statuses.iter().max_by_key(|s| s.id).map(|s| s.status).unwrap_or(RideStatusType::Matching)
}

/// Checks whether `actor` may move a ride from `current` to `requested`.
///
/// Chairs drive `ENROUTE` and `CARRYING`; riders drive `COMPLETED` and `CANCELED`. `PICKUP` and `ARRIVED` are never
/// requested explicitly. See [`implicit_transition`].
pub fn validate_transition(
    actor: Actor,
    current: RideStatusType,
    requested: RideStatusType,
) -> Result<(), TransitionError> {
    use RideStatusType::*;
    match (actor, requested) {
        (Actor::Chair, Enroute) if current == Matching => Ok(()),
        (Actor::Chair, Enroute) => Err(TransitionError::OutOfOrder { from: current, to: requested }),
        (Actor::Chair, Carrying) if current == Pickup => Ok(()),
        (Actor::Chair, Carrying) => Err(TransitionError::ChairNotArrived),
        (Actor::Rider, _) if current.is_terminal() => Err(TransitionError::RideFinished(current)),
        (Actor::Rider, Completed) if current == Arrived => Ok(()),
        (Actor::Rider, Completed) => Err(TransitionError::OutOfOrder { from: current, to: requested }),
        (Actor::Rider, Canceled) => Ok(()),
        _ => Err(TransitionError::UnsupportedStatus(requested)),
    }
}

/// The status a coordinate report at `at` moves the ride into, if any.
pub fn implicit_transition(current: RideStatusType, ride: &Ride, at: Coordinate) -> Option<RideStatusType> {
    match current {
        RideStatusType::Enroute if at == ride.pickup => Some(RideStatusType::Pickup),
        RideStatusType::Carrying if at == ride.destination => Some(RideStatusType::Arrived),
        _ => None,
    }
}

/// Whether a ride with this status history still holds its chair.
///
/// Canceled rides release the chair straight away. Otherwise the chair is busy until every forward status has been
/// delivered to it.
pub fn occupies_chair(statuses: &[RideStatus]) -> bool {
    if latest_status(statuses) == RideStatusType::Canceled {
        return false;
    }
    let delivered = statuses.iter().filter(|s| FORWARD_STATUSES.contains(&s.status) && s.is_delivered()).count();
    delivered < EXPECTED_STATUS_COUNT
}
